//! External tool management with nice error messages.
//!
//! This module provides a way to look up external executables with helpful
//! diagnostics when they're not found.

use std::path::PathBuf;
use std::process::Command;

use owo_colors::OwoColorize;
use thiserror::Error;

/// External tools that xtask depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// tree-sitter CLI for generating parsers
    TreeSitter,
}

/// Tools needed for `cargo xtask gen` (generation).
pub const GEN_TOOLS: &[Tool] = &[Tool::TreeSitter];

impl Tool {
    /// The executable name to search for in PATH.
    pub fn executable_name(self) -> &'static str {
        match self {
            Tool::TreeSitter => "tree-sitter",
        }
    }

    /// Human-readable name for error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Tool::TreeSitter => "tree-sitter CLI",
        }
    }

    /// Installation instructions for this tool (platform-aware).
    pub fn install_hint(self) -> &'static str {
        match self {
            Tool::TreeSitter => {
                if cfg!(target_os = "macos") {
                    "brew install tree-sitter"
                } else {
                    "cargo install tree-sitter-cli --locked"
                }
            }
        }
    }

    /// Look up the tool in PATH and return its absolute path.
    pub fn find(self) -> Result<ToolPath, ToolNotFound> {
        match which::which(self.executable_name()) {
            Ok(path) => Ok(ToolPath { path }),
            Err(_) => Err(ToolNotFound { tool: self }),
        }
    }
}

/// Check specified tools and print a report. Returns true if all are available.
pub fn check_tools_or_report(tools: &[Tool]) -> bool {
    let mut installed = Vec::new();
    let mut missing = Vec::new();

    for &tool in tools {
        match tool.find() {
            Ok(path) => installed.push((tool, path)),
            Err(_) => missing.push(tool),
        }
    }

    if missing.is_empty() {
        return true;
    }

    eprintln!("Missing Tools:");
    eprintln!("==============");
    for (tool, path) in &installed {
        eprintln!(
            "{} {} {}",
            "✓".green().bold(),
            tool.display_name().bold(),
            format!("({})", path.path().display()).dimmed()
        );
    }
    for tool in &missing {
        eprintln!("{} {}", "✗".red().bold(), tool.display_name().bold());
        eprintln!("    {}", tool.install_hint().yellow());
    }

    false
}

/// A resolved tool with its absolute path.
#[derive(Debug, Clone)]
pub struct ToolPath {
    path: PathBuf,
}

impl ToolPath {
    /// Create a new Command for this tool.
    pub fn command(&self) -> Command {
        Command::new(&self.path)
    }

    /// Get the absolute path to the tool.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Error when a required tool is not found in PATH.
#[derive(Debug, Error)]
#[error("{} not found in PATH\n\n  {}", .tool.display_name(), .tool.install_hint())]
pub struct ToolNotFound {
    pub tool: Tool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(Tool::TreeSitter.executable_name(), "tree-sitter");
        assert!(GEN_TOOLS.contains(&Tool::TreeSitter));
    }

    #[test]
    fn test_not_found_message_has_hint() {
        let err = ToolNotFound {
            tool: Tool::TreeSitter,
        };
        let message = err.to_string();
        assert!(message.starts_with("tree-sitter CLI not found in PATH"));
        assert!(message.contains(Tool::TreeSitter.install_hint()));
    }
}
