fn main() {
    // Build-time grammar sources live inside the crate when it is packaged,
    // so that crates.io verification can rebuild it in isolation:
    //
    //   grammar/
    //     src/
    //       parser.c
    //       grammar.json
    //       node-types.json
    //       tree_sitter/parser.h
    //
    // In a repository checkout `cargo xtask gen` has not necessarily copied
    // them yet, so fall back to the definition directory next to the crate.
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let crate_src_dir = manifest_dir.join("grammar/src");
    let def_src_dir = manifest_dir.join("../def/grammar/src");

    let src_dir = if crate_src_dir.join("parser.c").exists() {
        crate_src_dir
    } else {
        def_src_dir
    };

    let parser_path = src_dir.join("parser.c");
    println!("cargo:rerun-if-changed={}", parser_path.display());

    let mut build = cc::Build::new();

    build
        .std("c11")
        .include(&src_dir)
        .warnings(false)
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-but-set-variable")
        .flag_if_supported("-Wno-trigraphs");

    build.file(&parser_path);

    build.compile("tree_sitter_tempo");
}
