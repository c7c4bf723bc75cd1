//! Checked construction of the Tempo [`Language`].
//!
//! Every failure is reported with the same leading message so that callers
//! and test output can match on it, followed by the specific cause.

use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::{
    LANGUAGE_VERSION, Language, LanguageError, MIN_COMPATIBLE_LANGUAGE_VERSION, Parser,
};
use tree_sitter_language::LanguageFn;

use crate::LANGUAGE;

/// Errors that can occur while loading the Tempo grammar.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Error loading Tempo grammar: the binding returned a null language")]
    NullDescriptor,

    #[error(
        "Error loading Tempo grammar: ABI version {version} is outside the supported range {min}..={max}"
    )]
    IncompatibleAbi {
        version: usize,
        min: usize,
        max: usize,
    },

    #[error("Error loading Tempo grammar: {0}")]
    Rejected(#[from] LanguageError),
}

/// Loads the Tempo language, rejecting a null descriptor or an ABI version
/// the linked tree-sitter runtime cannot use.
pub fn load() -> Result<Language, LoadError> {
    load_from(LANGUAGE)
}

/// Returns a parser with the Tempo language installed.
pub fn parser() -> Result<Parser, LoadError> {
    let language = load()?;
    let mut parser = Parser::new();
    parser.set_language(&language)?;
    Ok(parser)
}

fn load_from(entry_point: LanguageFn) -> Result<Language, LoadError> {
    // SAFETY: the entry point takes no arguments and returns a pointer to a
    // static table; calling it has no side effects.
    let raw = unsafe { (entry_point.into_raw())() };
    if raw.is_null() {
        warn!("tempo grammar entry point returned null");
        return Err(LoadError::NullDescriptor);
    }

    let language = Language::new(entry_point);
    let version = language.abi_version();
    check_abi(version)?;

    debug!(
        abi_version = version,
        node_kinds = language.node_kind_count(),
        "loaded tempo grammar"
    );
    Ok(language)
}

fn check_abi(version: usize) -> Result<(), LoadError> {
    if (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
        return Ok(());
    }
    warn!(
        abi_version = version,
        min = MIN_COMPATIBLE_LANGUAGE_VERSION,
        max = LANGUAGE_VERSION,
        "tempo grammar has an incompatible ABI version"
    );
    Err(LoadError::IncompatibleAbi {
        version,
        min: MIN_COMPATIBLE_LANGUAGE_VERSION,
        max: LANGUAGE_VERSION,
    })
}
