//! Test harness for tree-sitter grammar crates.
//!
//! This crate provides utilities for testing a grammar, its queries, and its
//! corpus of expected trees.
//!
//! # Usage
//!
//! In the grammar crate's lib.rs tests:
//!
//! ```ignore
//! #[cfg(test)]
//! mod tests {
//!     use super::*;
//!
//!     #[test]
//!     fn test_grammar() {
//!         tempo_test_harness::test_grammar(
//!             language(),
//!             "tempo",
//!             HIGHLIGHTS_QUERY,
//!             INJECTIONS_QUERY,
//!             LOCALS_QUERY,
//!             concat!(env!("CARGO_MANIFEST_DIR"), "/../def"),
//!         );
//!     }
//! }
//! ```

pub use tree_sitter;
pub use tree_sitter_highlight;

mod corpus;

pub use corpus::{
    Attributes, CorpusEntry, CorpusError, CorpusSummary, normalize_sexp, parse_corpus, run_corpus,
    run_entries,
};

use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::Language;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter};

/// Tests a grammar by validating its queries and highlighting all samples.
///
/// This function:
/// 1. Validates that the queries compile correctly
/// 2. Finds sample files in the `samples/` directory of the grammar definition
/// 3. Highlights each sample file and verifies we get highlights
///
/// # Arguments
///
/// * `language` - The tree-sitter Language
/// * `name` - The grammar name (e.g., "tempo")
/// * `highlights_query` - The highlights.scm content
/// * `injections_query` - The injections.scm content
/// * `locals_query` - The locals.scm content
/// * `def_dir` - Path to the grammar definition directory (the one holding `samples/`)
///
/// # Panics
///
/// Panics if query validation fails, highlighting produces errors, or no highlights are found.
pub fn test_grammar(
    language: Language,
    name: &str,
    highlights_query: &str,
    injections_query: &str,
    locals_query: &str,
    def_dir: impl AsRef<Path>,
) {
    let mut config = HighlightConfiguration::new(
        language,
        name,
        highlights_query,
        injections_query,
        locals_query,
    )
    .unwrap_or_else(|e| {
        panic!(
            "Query validation failed for {}: {:?}\n\
             This usually means highlights.scm references a node type that doesn't exist in the grammar.\n\
             Check the grammar's node-types.json to see valid node types.",
            name, e
        );
    });

    config.configure(HIGHLIGHT_NAMES);

    let samples = find_samples(&def_dir.as_ref().join("samples"));
    if samples.is_empty() {
        // Nothing to highlight; the queries compiled above.
        return;
    }

    let mut highlighter = Highlighter::new();
    for sample_path in &samples {
        let sample_code = fs::read_to_string(sample_path).unwrap_or_else(|e| {
            panic!(
                "Failed to read sample file {} for {}: {}",
                sample_path.display(),
                name,
                e
            );
        });

        let highlights = highlighter
            .highlight(&config, sample_code.as_bytes(), None, |_| None)
            .unwrap_or_else(|e| {
                panic!(
                    "Failed to start highlighting {} for {}: {:?}",
                    sample_path.display(),
                    name,
                    e
                );
            });

        let mut highlight_count = 0;
        for event in highlights {
            let event = event.unwrap_or_else(|e| {
                panic!(
                    "Highlighting error in {} for {}: {:?}",
                    sample_path.display(),
                    name,
                    e
                );
            });
            if matches!(event, HighlightEvent::HighlightStart(_)) {
                highlight_count += 1;
            }
        }

        if highlight_count == 0 {
            panic!(
                "No highlights produced for {} in {}.\n\
                 Sample has {} bytes.\n\
                 This likely means the highlights.scm query doesn't match anything in the sample.",
                sample_path.display(),
                name,
                sample_code.len()
            );
        }
    }
}

/// Lists the regular files of a samples directory, sorted by path.
///
/// A missing directory yields no samples.
fn find_samples(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return vec![];
    };

    let mut samples: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    samples.sort();
    samples
}

/// Standard highlight names recognised by the harness.
pub const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",
    "boolean",
    "comment",
    "comment.documentation",
    "constant",
    "constant.builtin",
    "constructor",
    "embedded",
    "error",
    "escape",
    "function",
    "function.builtin",
    "keyword",
    "module",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "string",
    "string.escape",
    "tag",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_samples_missing_dir() {
        assert!(find_samples(Path::new("/nonexistent/tempo/samples")).is_empty());
    }

    #[test]
    fn test_find_samples_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.tempo"), "hello").unwrap();
        fs::write(dir.path().join("a.tempo"), "hello").unwrap();

        let samples = find_samples(dir.path());
        let names: Vec<_> = samples
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.tempo", "b.tempo"]);
    }

    #[test]
    fn test_highlight_names_include_keyword() {
        assert!(HIGHLIGHT_NAMES.contains(&"keyword"));
    }
}
