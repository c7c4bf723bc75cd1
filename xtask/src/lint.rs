//! Layout and metadata lints for grammar definitions.
//!
//! `tree-sitter.json` is the source of truth; every file it references, and
//! every file the crate build needs, must exist.

use camino::Utf8Path;
use owo_colors::OwoColorize;

use crate::metadata::{GrammarDef, MetadataError, discover};

/// Options for running lints.
#[derive(Debug, Clone, Copy, Default)]
pub struct LintOptions {
    /// Missing generated files (parser.c, node-types.json) are errors
    /// instead of warnings.
    pub strict: bool,
}

/// A lint diagnostic.
#[derive(Debug)]
pub enum LintDiagnostic {
    Error(String),
    Warning(String),
    Metadata(MetadataError),
}

impl LintDiagnostic {
    fn is_error(&self) -> bool {
        !matches!(self, LintDiagnostic::Warning(_))
    }
}

/// Run all lints on every grammar under `langs_dir`.
pub fn run_lints(langs_dir: &Utf8Path, options: LintOptions) -> miette::Result<()> {
    println!("{}", "Linting grammar definitions...".cyan().bold());
    println!();

    let defs = discover(langs_dir).map_err(|e| miette::miette!("{e}"))?;

    let mut errors = 0;
    let mut warnings = 0;

    for def in &defs {
        let diagnostics = lint_grammar(def, options);
        if diagnostics.is_empty() {
            println!("{} {} {}", "✓".green(), def.id.bold(), describe(def).dimmed());
            continue;
        }

        println!("{} {}", "●".yellow(), def.id.bold());
        for diagnostic in diagnostics {
            if diagnostic.is_error() {
                errors += 1;
            } else {
                warnings += 1;
            }
            match diagnostic {
                LintDiagnostic::Error(msg) => {
                    println!("  {} {}", "error:".red().bold(), msg);
                }
                LintDiagnostic::Warning(msg) => {
                    println!("  {} {}", "warning:".yellow(), msg);
                }
                LintDiagnostic::Metadata(e) => {
                    println!("  {}", "error:".red().bold());
                    println!("{:?}", miette::Report::new(e));
                }
            }
        }
        println!();
    }

    println!("{}", "─".repeat(60));
    println!();
    println!("Checked {} grammar(s)", defs.len());

    if errors > 0 {
        println!("{} {} error(s)", "✗".red(), errors);
    }
    if warnings > 0 {
        println!("{} {} warning(s)", "⚠".yellow(), warnings);
    }
    if errors == 0 && warnings == 0 {
        println!("{} All grammars are valid!", "✓".green());
    }

    if defs.is_empty() {
        miette::bail!("no grammar definitions found in {}", langs_dir);
    }
    if errors > 0 {
        miette::bail!("{} lint error(s)", errors);
    }
    Ok(())
}

/// `Tempo 0.1.0`, or empty if the metadata does not load.
fn describe(def: &GrammarDef) -> String {
    let Ok(metadata) = def.load_metadata() else {
        return String::new();
    };
    let grammar = metadata.grammar();
    format!(
        "{} {}",
        grammar.camelcase.as_deref().unwrap_or(&grammar.name),
        metadata.metadata.version
    )
}

/// Lint a single grammar definition and return diagnostics.
pub fn lint_grammar(def: &GrammarDef, options: LintOptions) -> Vec<LintDiagnostic> {
    let mut diagnostics = Vec::new();
    let gid = &def.id;

    let metadata = match def.load_metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            diagnostics.push(LintDiagnostic::Metadata(e));
            return diagnostics;
        }
    };
    let grammar = metadata.grammar();

    if grammar.name != def.id {
        diagnostics.push(LintDiagnostic::Error(format!(
            "grammar '{gid}': tree-sitter.json names the grammar '{}'",
            grammar.name
        )));
    }
    if grammar.file_types.is_empty() {
        diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no file-types declared",
        )));
    }

    if metadata.metadata.license.is_none() {
        diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no license in tree-sitter.json metadata",
        )));
    }
    if metadata.metadata.description.is_none() {
        diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no description in tree-sitter.json metadata",
        )));
    }

    if !def.grammar_js().is_file() {
        diagnostics.push(LintDiagnostic::Error(format!(
            "grammar '{gid}': missing grammar/grammar.js",
        )));
    }

    for generated in ["parser.c", "node-types.json"] {
        if def.grammar_src_dir().join(generated).is_file() {
            continue;
        }
        let msg = format!("grammar '{gid}': missing grammar/src/{generated} (run `cargo xtask gen`)");
        diagnostics.push(if options.strict {
            LintDiagnostic::Error(msg)
        } else {
            LintDiagnostic::Warning(msg)
        });
    }

    match &grammar.highlights {
        Some(queries) => {
            for path in queries.paths() {
                if !def.query_path(path).is_file() {
                    diagnostics.push(LintDiagnostic::Error(format!(
                        "grammar '{gid}': highlights query '{path}' does not exist",
                    )));
                }
            }
        }
        None => diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no highlights query declared",
        ))),
    }

    lint_samples(def, &mut diagnostics);

    let has_corpus = fs_err::read_dir(def.corpus_dir())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .any(|entry| entry.path().extension().is_some_and(|ext| ext == "txt"))
        })
        .unwrap_or(false);
    if !has_corpus {
        diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no corpus tests in test/corpus",
        )));
    }

    for file in ["Cargo.toml", "README.md"] {
        if !def.crate_dir.join(file).is_file() {
            diagnostics.push(LintDiagnostic::Error(format!(
                "grammar '{gid}': missing crate/{file}",
            )));
        }
    }

    diagnostics
}

fn lint_samples(def: &GrammarDef, diagnostics: &mut Vec<LintDiagnostic>) {
    let gid = &def.id;

    let Ok(entries) = fs_err::read_dir(def.samples_dir()) else {
        diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no samples directory",
        )));
        return;
    };

    let mut count = 0;
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        count += 1;
        let empty = fs_err::read_to_string(&path)
            .map(|content| content.trim().is_empty())
            .unwrap_or(true);
        if empty {
            diagnostics.push(LintDiagnostic::Error(format!(
                "sample '{}' is empty",
                path.display()
            )));
        }
    }

    if count == 0 {
        diagnostics.push(LintDiagnostic::Warning(format!(
            "grammar '{gid}': no samples defined",
        )));
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    const METADATA: &str = r#"{
      "grammars": [
        {
          "name": "tempo",
          "scope": "source.tempo",
          "file-types": ["tempo"],
          "highlights": "../queries/highlights.scm"
        }
      ],
      "metadata": {
        "version": "0.1.0",
        "license": "MIT",
        "description": "Tempo grammar"
      }
    }"#;

    fn write(path: &Utf8Path, content: &str) {
        fs_err::create_dir_all(path.parent().unwrap()).unwrap();
        fs_err::write(path, content).unwrap();
    }

    fn complete_layout() -> (tempfile::TempDir, GrammarDef) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let def = GrammarDef::new(&root.join("tempo"));

        write(&def.metadata_path(), METADATA);
        write(&def.grammar_js(), "module.exports = grammar({});");
        write(&def.grammar_src_dir().join("parser.c"), "/* parser */");
        write(&def.grammar_src_dir().join("node-types.json"), "[]");
        write(&def.def_dir.join("queries/highlights.scm"), "\"hello\" @keyword");
        write(&def.samples_dir().join("greeting.tempo"), "hello\n");
        write(&def.corpus_dir().join("basic.txt"), "");
        write(&def.crate_dir.join("Cargo.toml"), "[package]");
        write(&def.crate_dir.join("README.md"), "# tree-sitter-tempo");

        (dir, def)
    }

    #[test]
    fn test_complete_layout_is_clean() {
        let (_guard, def) = complete_layout();
        let diagnostics = lint_grammar(&def, LintOptions { strict: true });
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
    }

    #[test]
    fn test_missing_parser_strictness() {
        let (_guard, def) = complete_layout();
        fs_err::remove_file(def.grammar_src_dir().join("parser.c")).unwrap();

        let lenient = lint_grammar(&def, LintOptions { strict: false });
        assert_eq!(lenient.len(), 1);
        assert!(!lenient[0].is_error());

        let strict = lint_grammar(&def, LintOptions { strict: true });
        assert_eq!(strict.len(), 1);
        assert!(strict[0].is_error());
    }

    #[test]
    fn test_empty_sample_and_missing_query() {
        let (_guard, def) = complete_layout();
        write(&def.samples_dir().join("blank.tempo"), "  \n");
        fs_err::remove_file(def.def_dir.join("queries/highlights.scm")).unwrap();

        let diagnostics = lint_grammar(&def, LintOptions::default());
        let errors: Vec<_> = diagnostics
            .iter()
            .filter_map(|d| match d {
                LintDiagnostic::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(errors.len(), 2, "{diagnostics:?}");
        assert!(errors.iter().any(|m| m.contains("highlights query")));
        assert!(errors.iter().any(|m| m.contains("is empty")));
    }

    #[test]
    fn test_missing_crate_readme() {
        let (_guard, def) = complete_layout();
        fs_err::remove_file(def.crate_dir.join("README.md")).unwrap();

        let diagnostics = lint_grammar(&def, LintOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
        assert!(matches!(
            &diagnostics[0],
            LintDiagnostic::Error(msg) if msg.contains("crate/README.md")
        ));
    }

    #[test]
    fn test_describe() {
        let (_guard, def) = complete_layout();
        assert_eq!(describe(&def), "tempo 0.1.0");

        write(&def.metadata_path(), "{ not json");
        assert_eq!(describe(&def), "");
    }

    #[test]
    fn test_invalid_metadata_stops_linting() {
        let (_guard, def) = complete_layout();
        write(&def.metadata_path(), "{ not json");

        let diagnostics = lint_grammar(&def, LintOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0],
            LintDiagnostic::Metadata(MetadataError::Parse { .. })
        ));
    }

    #[test]
    fn test_repository_grammars_are_clean() {
        let langs = Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("../langs");
        let defs = discover(&langs).unwrap();
        assert!(defs.iter().any(|d| d.id == "tempo"));

        for def in &defs {
            let diagnostics = lint_grammar(def, LintOptions { strict: true });
            assert!(diagnostics.is_empty(), "{}: {diagnostics:?}", def.id);
        }
    }
}
