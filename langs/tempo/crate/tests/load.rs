//! Loading tests for the Tempo language.

use tree_sitter_tempo::{LANGUAGE, language, load};

#[test]
fn can_load_grammar() {
    let raw = unsafe { (LANGUAGE.into_raw())() };
    assert!(!raw.is_null(), "Error loading Tempo grammar");

    if let Err(e) = load() {
        panic!("{e}");
    }
}

#[test]
fn repeated_loads_agree() {
    let first = unsafe { (LANGUAGE.into_raw())() };
    let second = unsafe { (LANGUAGE.into_raw())() };
    assert!(!first.is_null() && !second.is_null());
    assert_eq!(first, second);

    let a = load().unwrap();
    let b = load().unwrap();
    assert_eq!(a.abi_version(), b.abi_version());
    assert_eq!(a.node_kind_count(), b.node_kind_count());
}

#[test]
fn exposes_node_kinds() {
    let language = language();

    assert_eq!(language.node_kind_count(), 3);

    let source_file = language.id_for_node_kind("source_file", true);
    assert_eq!(language.node_kind_for_id(source_file), Some("source_file"));
    assert!(language.node_kind_is_named(source_file));

    let hello = language.id_for_node_kind("hello", false);
    assert_ne!(hello, 0);
    assert!(!language.node_kind_is_named(hello));
}
