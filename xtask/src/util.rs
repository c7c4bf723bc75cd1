//! Shared utilities for xtask commands

use std::env;

use camino::Utf8PathBuf;

/// Find the repository root by looking for Cargo.toml with [workspace]
pub fn find_repo_root() -> Option<Utf8PathBuf> {
    let cwd = env::current_dir().ok()?;
    let mut current = Utf8PathBuf::from_path_buf(cwd).ok()?;

    loop {
        let cargo_toml = current.join("Cargo.toml");
        if let Ok(contents) = fs_err::read_to_string(&cargo_toml)
            && contents.contains("[workspace]")
        {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
