//! Regenerate parser sources with `tree-sitter generate`.
//!
//! Generation runs in a temporary copy of the grammar directory so a failed
//! run never leaves half-written files in the tree. The output is then
//! planned into both `def/grammar/src/` and `crate/grammar/src/`.

use std::process::Stdio;

use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, miette};
use owo_colors::OwoColorize;
use walkdir::WalkDir;

use crate::metadata::{GrammarDef, discover};
use crate::plan::{Plan, PlanSet, plan_file_update};
use crate::tool::{Tool, ToolPath};

/// Options for generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions<'a> {
    /// Only regenerate this grammar.
    pub name: Option<&'a str>,
}

/// Plan regeneration for all grammars (or the one named in `options`).
pub fn plan_generate(langs_dir: &Utf8Path, options: GenerateOptions<'_>) -> miette::Result<PlanSet> {
    let defs = discover(langs_dir).into_diagnostic()?;
    let defs: Vec<_> = defs
        .into_iter()
        .filter(|def| options.name.is_none_or(|name| def.id == name))
        .collect();

    if defs.is_empty() {
        return Err(match options.name {
            Some(name) => miette!("no grammar named '{}' in {}", name, langs_dir),
            None => miette!("no grammar definitions found in {}", langs_dir),
        });
    }

    let tree_sitter = Tool::TreeSitter.find().into_diagnostic()?;

    let mut plans = PlanSet::new();
    for def in &defs {
        println!("● {} ({})", def.id.yellow(), "regenerating".dimmed());
        plans.add(plan_grammar(def, &tree_sitter)?);
    }
    Ok(plans)
}

fn plan_grammar(def: &GrammarDef, tree_sitter: &ToolPath) -> miette::Result<Plan> {
    let temp = tempfile::tempdir().into_diagnostic()?;
    let temp_grammar = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .map_err(|path| miette!("non-UTF8 temp path: {}", path.display()))?;

    fs_err::copy(def.grammar_js(), temp_grammar.join("grammar.js")).into_diagnostic()?;
    fs_err::copy(def.metadata_path(), temp_grammar.join("tree-sitter.json")).into_diagnostic()?;
    fs_err::create_dir_all(temp_grammar.join("src")).into_diagnostic()?;

    tracing::debug!(
        grammar = %def.id,
        tool = %tree_sitter.path().display(),
        dir = %temp_grammar,
        "running tree-sitter generate"
    );
    let output = tree_sitter
        .command()
        .args(["generate"])
        .current_dir(&temp_grammar)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .into_diagnostic()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let error_lines: Vec<&str> = stderr.lines().take(20).collect();
        return Err(miette!(
            "tree-sitter generate failed for {}:\n{}",
            def.id,
            error_lines.join("\n")
        ));
    }

    let generated_src = temp_grammar.join("src");
    let mut plan = Plan::for_grammar(&def.id);
    plan_updates_from_generated(&mut plan, &generated_src, &def.grammar_src_dir())
        .into_diagnostic()?;
    plan_updates_from_generated(&mut plan, &generated_src, &def.crate_grammar_src_dir())
        .into_diagnostic()?;
    Ok(plan)
}

/// Files under `src/` produced by `tree-sitter generate`.
fn is_generated_file(relative: &Utf8Path) -> bool {
    matches!(
        relative.file_name(),
        Some("parser.c" | "scanner.c" | "grammar.json" | "node-types.json")
    ) || relative.extension() == Some("h")
}

/// Plans copying every generated file from `generated_src` into `dest_src_dir`,
/// keeping the relative layout (`tree_sitter/parser.h` included).
fn plan_updates_from_generated(
    plan: &mut Plan,
    generated_src: &Utf8Path,
    dest_src_dir: &Utf8Path,
) -> std::io::Result<()> {
    for entry in WalkDir::new(generated_src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(generated_src)
            .ok()
            .and_then(Utf8Path::from_path)
            .ok_or_else(|| std::io::Error::other("non-UTF8 generated path"))?;
        if !is_generated_file(relative) {
            continue;
        }

        let new_content = fs_err::read_to_string(entry.path())?;
        plan_file_update(
            plan,
            &dest_src_dir.join(relative),
            new_content,
            &format!("src/{}", relative),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    fn write(path: &Utf8Path, content: &str) {
        fs_err::create_dir_all(path.parent().unwrap()).unwrap();
        fs_err::write(path, content).unwrap();
    }

    #[test]
    fn test_is_generated_file() {
        assert!(is_generated_file(Utf8Path::new("parser.c")));
        assert!(is_generated_file(Utf8Path::new("node-types.json")));
        assert!(is_generated_file(Utf8Path::new("tree_sitter/parser.h")));
        assert!(!is_generated_file(Utf8Path::new("README.md")));
        assert!(!is_generated_file(Utf8Path::new("grammar.js")));
    }

    #[test]
    fn test_plan_updates_from_generated() {
        let (_guard, root) = temp_dir();
        let generated = root.join("generated");
        let dest = root.join("dest");

        write(&generated.join("parser.c"), "new parser");
        write(&generated.join("node-types.json"), "[]");
        write(&generated.join("tree_sitter/parser.h"), "header");
        write(&generated.join("notes.txt"), "ignored");

        write(&dest.join("parser.c"), "old parser");
        write(&dest.join("node-types.json"), "[]");

        let mut plan = Plan::for_grammar("tempo");
        plan_updates_from_generated(&mut plan, &generated, &dest).unwrap();

        let described: Vec<_> = plan.operations().map(|op| op.description()).collect();
        assert_eq!(
            described,
            ["Update src/parser.c", "Create src/tree_sitter/parser.h"]
        );

        plan.execute().unwrap();
        assert_eq!(fs_err::read_to_string(dest.join("parser.c")).unwrap(), "new parser");
        assert_eq!(
            fs_err::read_to_string(dest.join("tree_sitter/parser.h")).unwrap(),
            "header"
        );
        assert!(!dest.join("notes.txt").exists());
    }

    #[test]
    fn test_unknown_grammar_name() {
        let (_guard, root) = temp_dir();
        fs_err::create_dir_all(root.join("tempo/def")).unwrap();

        let err = plan_generate(&root, GenerateOptions { name: Some("other") }).unwrap_err();
        assert!(err.to_string().contains("no grammar named 'other'"));
    }
}
