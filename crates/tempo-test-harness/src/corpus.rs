//! Corpus tests in the tree-sitter text format.
//!
//! A corpus file is a sequence of entries:
//!
//! ```text
//! ==================
//! Entry name
//! :error
//! ==================
//!
//! input source
//!
//! ---
//!
//! (expected (tree))
//! ```
//!
//! Header and divider lines are runs of at least three `=` or `-`. Lines
//! starting with `:` between the header lines are attributes. An `:error`
//! entry has no expected tree and passes when the parse contains an error.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tree_sitter::{Language, Parser};

/// Attributes attached to a corpus entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attributes {
    /// The input must parse with at least one error.
    pub error: bool,
    /// The entry is not run.
    pub skip: bool,
}

/// A single named test case from a corpus file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub name: String,
    pub attributes: Attributes,
    pub input: String,
    /// Expected S-expression, already normalized.
    pub expected: String,
    /// 1-based line of the entry's opening header.
    pub line: usize,
}

/// Errors produced while reading a corpus file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorpusError {
    #[error("line {line}: expected a `===` header, found `{found}`")]
    UnexpectedLine { line: usize, found: String },

    #[error("line {line}: header has no entry name")]
    MissingName { line: usize },

    #[error("line {line}: header of `{name}` is not closed")]
    UnterminatedHeader { line: usize, name: String },

    #[error("line {line}: unknown attribute `:{attribute}`")]
    UnknownAttribute { line: usize, attribute: String },

    #[error("line {line}: entry `{name}` has no `---` divider")]
    MissingDivider { line: usize, name: String },
}

/// Outcome of a corpus run that did not fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusSummary {
    pub passed: usize,
    pub skipped: usize,
}

impl std::ops::AddAssign for CorpusSummary {
    fn add_assign(&mut self, other: Self) {
        self.passed += other.passed;
        self.skipped += other.skipped;
    }
}

fn is_rule(line: &str, ch: char) -> bool {
    let line = line.trim_end();
    line.len() >= 3 && line.chars().all(|c| c == ch)
}

fn is_header(line: &str) -> bool {
    is_rule(line, '=')
}

fn is_divider(line: &str) -> bool {
    is_rule(line, '-')
}

/// Parses the text of a corpus file into its entries.
pub fn parse_corpus(text: &str) -> Result<Vec<CorpusEntry>, CorpusError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }
        if !is_header(lines[i]) {
            return Err(CorpusError::UnexpectedLine {
                line: i + 1,
                found: lines[i].to_string(),
            });
        }

        let header_line = i + 1;
        i += 1;

        let name = match lines.get(i).map(|l| l.trim()) {
            Some(name) if !name.is_empty() && !is_header(name) => name.to_string(),
            _ => return Err(CorpusError::MissingName { line: header_line }),
        };
        i += 1;

        let mut attributes = Attributes::default();
        loop {
            let Some(line) = lines.get(i) else {
                return Err(CorpusError::UnterminatedHeader {
                    line: header_line,
                    name,
                });
            };
            i += 1;

            let trimmed = line.trim();
            if is_header(trimmed) {
                break;
            }
            match trimmed.strip_prefix(':') {
                Some("error") => attributes.error = true,
                Some("skip") => attributes.skip = true,
                Some(other) => {
                    return Err(CorpusError::UnknownAttribute {
                        line: i,
                        attribute: other.to_string(),
                    });
                }
                None if trimmed.is_empty() => {}
                None => {
                    return Err(CorpusError::UnterminatedHeader {
                        line: header_line,
                        name,
                    });
                }
            }
        }

        let input_start = i;
        while i < lines.len() && !is_divider(lines[i]) {
            i += 1;
        }
        if i == lines.len() {
            return Err(CorpusError::MissingDivider {
                line: header_line,
                name,
            });
        }
        let input = trim_blank_lines(&lines[input_start..i]);
        i += 1;

        let expected_start = i;
        while i < lines.len() && !is_header(lines[i]) {
            i += 1;
        }
        let expected = normalize_sexp(&lines[expected_start..i].join("\n"));

        entries.push(CorpusEntry {
            name,
            attributes,
            input,
            expected,
            line: header_line,
        });
    }

    Ok(entries)
}

/// Joins lines, dropping empty lines at both ends. Whitespace inside the
/// input (including whitespace-only lines) is kept.
fn trim_blank_lines(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(start, |p| p + 1);
    lines[start..end].join("\n")
}

/// Collapses whitespace in an S-expression so that trees can be compared
/// independently of how they were wrapped.
pub fn normalize_sexp(sexp: &str) -> String {
    let mut out = String::with_capacity(sexp.len());
    let mut pending_space = false;

    for ch in sexp.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && ch != ')' && !out.is_empty() && !out.ends_with('(') {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }

    out
}

/// Runs already parsed corpus entries against a language.
///
/// # Panics
///
/// Panics with a report of every failing entry, or if the language cannot
/// be installed in a parser.
pub fn run_entries(language: &Language, file: &str, entries: &[CorpusEntry]) -> CorpusSummary {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .unwrap_or_else(|e| panic!("Failed to set language for {}: {}", file, e));

    let mut summary = CorpusSummary::default();
    let mut failures = Vec::new();

    for entry in entries {
        if entry.attributes.skip {
            summary.skipped += 1;
            continue;
        }

        let Some(tree) = parser.parse(&entry.input, None) else {
            failures.push(format!("{}:{} `{}`: parse was cancelled", file, entry.line, entry.name));
            continue;
        };
        let root = tree.root_node();

        if entry.attributes.error {
            if root.has_error() {
                summary.passed += 1;
            } else {
                failures.push(format!(
                    "{}:{} `{}`: expected an error, got {}",
                    file,
                    entry.line,
                    entry.name,
                    root.to_sexp()
                ));
            }
            continue;
        }

        let actual = normalize_sexp(&root.to_sexp());
        if actual == entry.expected {
            summary.passed += 1;
        } else {
            failures.push(format!(
                "{}:{} `{}`:\n    expected: {}\n    actual:   {}",
                file, entry.line, entry.name, entry.expected, actual
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "{} corpus entr{} failed:\n  {}",
            failures.len(),
            if failures.len() == 1 { "y" } else { "ies" },
            failures.join("\n  ")
        );
    }

    summary
}

/// Runs every `*.txt` corpus file in `corpus_dir` against a language.
///
/// # Panics
///
/// Panics if the directory holds no corpus entries, if every entry is
/// skipped, if a file cannot be read or parsed, or if any entry fails.
pub fn run_corpus(language: &Language, corpus_dir: &Path) -> CorpusSummary {
    let entries = fs::read_dir(corpus_dir).unwrap_or_else(|e| {
        panic!(
            "Failed to read corpus directory {}: {}",
            corpus_dir.display(),
            e
        )
    });

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();

    let mut summary = CorpusSummary::default();
    let mut total = 0;

    for path in &files {
        let text = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read corpus file {}: {}", path.display(), e));
        let corpus = parse_corpus(&text)
            .unwrap_or_else(|e| panic!("Invalid corpus file {}: {}", path.display(), e));

        total += corpus.len();
        summary += run_entries(language, &path.display().to_string(), &corpus);
    }

    if total == 0 {
        panic!("No corpus entries found in {}", corpus_dir.display());
    }
    if summary.passed == 0 {
        panic!(
            "No corpus entries ran in {}: all {} are skipped",
            corpus_dir.display(),
            summary.skipped
        );
    }

    summary
}
