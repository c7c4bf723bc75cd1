//! Grammar definitions and their `tree-sitter.json` metadata.
//!
//! Every language lives under `langs/<id>/`:
//!
//! ```text
//! langs/tempo/
//!   def/
//!     grammar/
//!       grammar.js
//!       tree-sitter.json
//!       src/            (generated by `tree-sitter generate`)
//!     queries/
//!     samples/
//!     test/corpus/
//!   crate/              (the published Rust crate)
//! ```
//!
//! `tree-sitter.json` is the single source of truth for the grammar's name,
//! scope, file types and query locations.

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;

/// Contents of a `tree-sitter.json` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub grammars: Vec<GrammarEntry>,
    pub metadata: PackageInfo,
}

/// One entry of the `grammars` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrammarEntry {
    pub name: String,
    pub camelcase: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub file_types: Vec<String>,
    pub highlights: Option<QueryPaths>,
}

/// Query locations may be a single path or a list of paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QueryPaths {
    One(String),
    Many(Vec<String>),
}

impl QueryPaths {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            QueryPaths::One(path) => vec![path.as_str()],
            QueryPaths::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// The `metadata` object.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    pub version: String,
    pub license: Option<String>,
    pub description: Option<String>,
}

/// Errors raised while loading metadata.
#[derive(Debug, Error, Diagnostic)]
pub enum MetadataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid tree-sitter.json: {message}")]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("{path} declares no grammars")]
    #[diagnostic(help("add an entry to the `grammars` array"))]
    Empty { path: String },
}

impl Metadata {
    /// Reads and parses a `tree-sitter.json` file.
    pub fn load(path: &Utf8Path) -> Result<Self, MetadataError> {
        let text = fs_err::read_to_string(path)?;
        Self::parse(path.as_str(), text)
    }

    /// Parses `tree-sitter.json` content; `name` labels diagnostics.
    pub fn parse(name: &str, text: String) -> Result<Self, MetadataError> {
        match serde_json::from_str::<Metadata>(&text) {
            Ok(metadata) if metadata.grammars.is_empty() => Err(MetadataError::Empty {
                path: name.to_string(),
            }),
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                let offset = offset_of(&text, e.line(), e.column());
                Err(MetadataError::Parse {
                    message: e.to_string(),
                    src: NamedSource::new(name, text),
                    span: offset.into(),
                })
            }
        }
    }

    /// The primary grammar of the definition.
    pub fn grammar(&self) -> &GrammarEntry {
        &self.grammars[0]
    }
}

/// Converts serde_json's 1-based line/column into a byte offset.
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Paths of one language under `langs/`.
#[derive(Debug, Clone)]
pub struct GrammarDef {
    /// Directory name under `langs/`.
    pub id: String,
    pub def_dir: Utf8PathBuf,
    pub crate_dir: Utf8PathBuf,
}

impl GrammarDef {
    pub fn new(lang_dir: &Utf8Path) -> Self {
        Self {
            id: lang_dir.file_name().unwrap_or_default().to_string(),
            def_dir: lang_dir.join("def"),
            crate_dir: lang_dir.join("crate"),
        }
    }

    pub fn grammar_dir(&self) -> Utf8PathBuf {
        self.def_dir.join("grammar")
    }

    pub fn grammar_js(&self) -> Utf8PathBuf {
        self.grammar_dir().join("grammar.js")
    }

    pub fn metadata_path(&self) -> Utf8PathBuf {
        self.grammar_dir().join("tree-sitter.json")
    }

    /// Generated sources in the definition directory.
    pub fn grammar_src_dir(&self) -> Utf8PathBuf {
        self.grammar_dir().join("src")
    }

    /// Copy of the generated sources shipped with the crate.
    pub fn crate_grammar_src_dir(&self) -> Utf8PathBuf {
        self.crate_dir.join("grammar/src")
    }

    pub fn samples_dir(&self) -> Utf8PathBuf {
        self.def_dir.join("samples")
    }

    pub fn corpus_dir(&self) -> Utf8PathBuf {
        self.def_dir.join("test/corpus")
    }

    /// Resolves a query path from `tree-sitter.json`, which is relative to
    /// the directory holding that file.
    pub fn query_path(&self, relative: &str) -> Utf8PathBuf {
        self.grammar_dir().join(relative)
    }

    pub fn load_metadata(&self) -> Result<Metadata, MetadataError> {
        Metadata::load(&self.metadata_path())
    }
}

/// Finds every language directory under `langs_dir` that has a `def/`.
pub fn discover(langs_dir: &Utf8Path) -> std::io::Result<Vec<GrammarDef>> {
    let mut defs = Vec::new();

    for entry in fs_err::read_dir(langs_dir)? {
        let entry = entry?;
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            continue;
        };
        if path.join("def").is_dir() {
            defs.push(GrammarDef::new(&path));
        }
    }

    defs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(defs)
}
