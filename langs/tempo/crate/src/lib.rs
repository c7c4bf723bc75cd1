#![doc = include_str!("../README.md")]

use tree_sitter::Language;
use tree_sitter_language::LanguageFn;

mod load;

pub use load::{LoadError, load, parser};

unsafe extern "C" {
    fn tree_sitter_tempo() -> *const ();
}

/// The raw entry point of the compiled Tempo parser.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_tempo) };

/// Returns the tempo tree-sitter language.
///
/// This trusts the compiled parser. Use [`load`] to have the descriptor and
/// its ABI version checked first.
pub fn language() -> Language {
    Language::new(LANGUAGE)
}

/// Grammar name, as declared in `grammar.js`.
pub const GRAMMAR_NAME: &str = "tempo";

/// TextMate-style scope of Tempo sources.
pub const SCOPE: &str = "source.tempo";

/// File extensions (without dot) recognised as Tempo.
pub const FILE_TYPES: &[&str] = &["tempo"];

/// The content of the grammar's `node-types.json`.
pub const NODE_TYPES: &str = include_str!("../../def/grammar/src/node-types.json");

/// The highlights query for tempo.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../../def/queries/highlights.scm");

/// The injections query for tempo (empty - no injections available).
pub const INJECTIONS_QUERY: &str = "";

/// The locals query for tempo (empty - no locals available).
pub const LOCALS_QUERY: &str = "";

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn def_dir() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../def")
    }

    #[test]
    fn test_can_load_grammar() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&LANGUAGE.into())
            .expect("Error loading Tempo grammar");
    }

    #[test]
    fn test_grammar() {
        tempo_test_harness::test_grammar(
            language(),
            GRAMMAR_NAME,
            HIGHLIGHTS_QUERY,
            INJECTIONS_QUERY,
            LOCALS_QUERY,
            def_dir(),
        );
    }

    #[test]
    fn test_constants_match_tree_sitter_json() {
        let path = def_dir().join("grammar/tree-sitter.json");
        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let grammar = &json["grammars"][0];

        assert_eq!(grammar["name"], GRAMMAR_NAME);
        assert_eq!(grammar["scope"], SCOPE);

        let file_types: Vec<&str> = grammar["file-types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(file_types, FILE_TYPES);
    }

    #[test]
    fn test_node_types_lists_source_file() {
        #[derive(serde::Deserialize)]
        struct NodeType {
            #[serde(rename = "type")]
            kind: String,
            named: bool,
        }

        let node_types: Vec<NodeType> = serde_json::from_str(NODE_TYPES).unwrap();
        let language = language();

        for node in &node_types {
            let id = language.id_for_node_kind(&node.kind, node.named);
            assert_ne!(id, 0, "node type {} is unknown to the parser", node.kind);
        }
        assert!(node_types.iter().any(|n| n.kind == "source_file" && n.named));
    }
}
