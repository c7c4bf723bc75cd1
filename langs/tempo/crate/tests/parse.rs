//! Parsing tests for the Tempo grammar.

use std::path::Path;

use indoc::indoc;
use tree_sitter_tempo::{language, parser};

fn sexp(source: &str) -> (String, bool) {
    let mut parser = parser().unwrap();
    let tree = parser.parse(source, None).expect("parse was cancelled");
    let root = tree.root_node();
    (root.to_sexp(), root.has_error())
}

#[test]
fn parses_greeting() {
    let (tree, has_error) = sexp("hello");
    assert_eq!(tree, "(source_file)");
    assert!(!has_error);
}

#[test]
fn greeting_token_is_anonymous_child() {
    let mut parser = parser().unwrap();
    let tree = parser.parse("  hello\n", None).unwrap();
    let root = tree.root_node();

    assert_eq!(root.kind(), "source_file");
    assert_eq!(root.named_child_count(), 0);
    assert_eq!(root.child_count(), 1);

    let token = root.child(0).unwrap();
    assert_eq!(token.kind(), "hello");
    assert!(!token.is_named());
    assert_eq!(token.start_byte(), 2);
    assert_eq!(token.end_byte(), 7);
}

#[test]
fn rejects_other_input() {
    for source in ["goodbye", "hello hello", "help"] {
        let (tree, has_error) = sexp(source);
        assert!(has_error, "{source:?} parsed without errors: {tree}");
    }
}

#[test]
fn sample_file_parses_cleanly() {
    let sample = Path::new(env!("CARGO_MANIFEST_DIR")).join("../def/samples/greeting.tempo");
    let source = std::fs::read_to_string(sample).unwrap();
    let (_, has_error) = sexp(&source);
    assert!(!has_error);
}

#[test]
fn inline_corpus() {
    let corpus = indoc! {"
        ==================
        Indented greeting
        ==================

            hello

        ---

        (source_file)

        ==================
        Truncated greeting
        :error
        ==================

        hell

        ---
    "};

    let entries = tempo_test_harness::parse_corpus(corpus).unwrap();
    assert_eq!(entries.len(), 2);

    let summary = tempo_test_harness::run_entries(&language(), "inline", &entries);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.skipped, 0);
}

#[test]
fn corpus() {
    let corpus_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../def/test/corpus");
    let summary = tempo_test_harness::run_corpus(&language(), &corpus_dir);
    assert!(summary.passed >= 4);
}
