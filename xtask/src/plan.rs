//! Plan-execute pattern for xtask operations.
//!
//! Operations are planned before anything touches the tree, so `--dry-run`
//! can show exactly what would change.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use owo_colors::OwoColorize;
use thiserror::Error;

/// A single operation that can be planned and executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create a new file with the given content.
    CreateFile {
        path: Utf8PathBuf,
        content: String,
        description: String,
    },

    /// Update an existing file with new content.
    UpdateFile {
        path: Utf8PathBuf,
        old_content: String,
        new_content: String,
        description: String,
    },
}

impl Operation {
    /// Returns a human-readable description of this operation.
    pub fn description(&self) -> &str {
        match self {
            Operation::CreateFile { description, .. } => description,
            Operation::UpdateFile { description, .. } => description,
        }
    }

    /// Returns the path affected by this operation.
    pub fn path(&self) -> &Utf8Path {
        match self {
            Operation::CreateFile { path, .. } => path,
            Operation::UpdateFile { path, .. } => path,
        }
    }

    /// Execute this operation.
    pub fn execute(&self) -> Result<(), ExecuteError> {
        match self {
            Operation::CreateFile { path, content, .. } => {
                if let Some(parent) = path.parent() {
                    fs_err::create_dir_all(parent)?;
                }
                fs_err::write(path, content)?;
            }
            Operation::UpdateFile {
                path, new_content, ..
            } => {
                fs_err::write(path, new_content)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateFile { path, .. } => write!(f, "create {}", path),
            Operation::UpdateFile { path, .. } => write!(f, "update {}", path),
        }
    }
}

/// Error during operation execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Plans writing `new_content` to `dest_path`: nothing if the file already
/// holds it, an update if it differs, a create if it is missing.
pub fn plan_file_update(
    plan: &mut Plan,
    dest_path: &Utf8Path,
    new_content: String,
    description: &str,
) -> std::io::Result<()> {
    if dest_path.exists() {
        let old_content = fs_err::read_to_string(dest_path)?;
        if old_content != new_content {
            plan.add(Operation::UpdateFile {
                path: dest_path.to_owned(),
                old_content,
                new_content,
                description: format!("Update {}", description),
            });
        }
    } else {
        plan.add(Operation::CreateFile {
            path: dest_path.to_owned(),
            content: new_content,
            description: format!("Create {}", description),
        });
    }
    Ok(())
}

/// Display a simple line-by-line diff between old and new content.
fn display_diff(old: &str, new: &str) {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let max_len = old_lines.len().max(new_lines.len());
    let differs = |i: usize| old_lines.get(i) != new_lines.get(i);

    let Some(first) = (0..max_len).find(|&i| differs(i)) else {
        println!("    {}", "(no changes)".dimmed());
        return;
    };
    let last = (0..max_len).rev().find(|&i| differs(i)).unwrap_or(first);

    let context = 2;
    let start = first.saturating_sub(context);
    let end = (last + context + 1).min(max_len);

    if start > 0 {
        println!("    {}", format!("@@ line {} @@", start + 1).dimmed());
    }

    for i in start..end {
        match (old_lines.get(i), new_lines.get(i)) {
            (Some(o), Some(n)) if o == n => {
                println!("    {} {}", " ".dimmed(), o.dimmed());
            }
            (Some(o), Some(n)) => {
                println!("    {} {}", "-".red(), o.red());
                println!("    {} {}", "+".green(), n.green());
            }
            (Some(o), None) => {
                println!("    {} {}", "-".red(), o.red());
            }
            (None, Some(n)) => {
                println!("    {} {}", "+".green(), n.green());
            }
            (None, None) => {}
        }
    }

    if end < max_len {
        println!(
            "    {}",
            format!("... {} more lines", max_len - end).dimmed()
        );
    }
}

/// A plan consisting of multiple operations.
#[derive(Debug, Default)]
pub struct Plan {
    operations: Vec<Operation>,
    pub grammar: Option<String>,
}

impl Plan {
    /// Create a new plan for a specific grammar.
    pub fn for_grammar(name: impl Into<String>) -> Self {
        Self {
            operations: Vec::new(),
            grammar: Some(name.into()),
        }
    }

    /// Add an operation to the plan.
    pub fn add(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Returns true if the plan has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns the number of operations in the plan.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Iterate over operations.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    /// Display the plan to the user.
    pub fn display(&self) {
        if let Some(ref name) = self.grammar {
            println!("{} {}", "●".cyan(), name.bold());
        }

        if self.operations.is_empty() {
            println!("  {}", "(no changes)".dimmed());
            return;
        }

        for op in &self.operations {
            match op {
                Operation::CreateFile {
                    path,
                    content,
                    description,
                } => {
                    println!("  {} {}", "create".green(), description);
                    println!("    {} {}", "->".dimmed(), path);
                    for line in content.lines().take(10) {
                        println!("    {} {}", "+".green(), line.green());
                    }
                    let total_lines = content.lines().count();
                    if total_lines > 10 {
                        println!("    {} ... {} more lines", "+".green(), total_lines - 10);
                    }
                }
                Operation::UpdateFile {
                    path,
                    old_content,
                    new_content,
                    description,
                } => {
                    println!("  {} {}", "update".yellow(), description);
                    println!("    {} {}", "->".dimmed(), path);
                    display_diff(old_content, new_content);
                }
            }
        }
    }

    /// Execute all operations in the plan.
    pub fn execute(&self) -> Result<(), ExecuteError> {
        for op in &self.operations {
            tracing::debug!(path = %op.path(), "{}", op.description());
            op.execute()?;
        }
        Ok(())
    }
}

/// A collection of plans, one per grammar.
#[derive(Debug, Default)]
pub struct PlanSet {
    plans: Vec<Plan>,
}

impl PlanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plan to the set. Empty plans are dropped.
    pub fn add(&mut self, plan: Plan) {
        if !plan.is_empty() {
            self.plans.push(plan);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Total number of operations across all plans.
    pub fn total_operations(&self) -> usize {
        self.plans.iter().map(|p| p.len()).sum()
    }

    /// Display all plans.
    pub fn display(&self, dry_run: bool) {
        if dry_run {
            println!("Dry run - showing what would be done:\n");
        }

        if self.is_empty() {
            println!("Nothing to do.");
            return;
        }

        for plan in &self.plans {
            plan.display();
            println!();
        }

        println!(
            "Total: {} operation(s) across {} grammar(s)",
            self.total_operations(),
            self.plans.len()
        );

        if dry_run {
            println!("\nRun without --dry-run to apply changes.");
        }
    }

    /// Display and optionally execute the plans.
    pub fn run(&self, dry_run: bool) -> Result<(), ExecuteError> {
        self.display(dry_run);
        if dry_run || self.is_empty() {
            return Ok(());
        }

        println!();
        for plan in &self.plans {
            if let Some(ref name) = plan.grammar {
                println!("Processing {}...", name);
            }
            plan.execute()?;
        }
        println!(
            "\nDone! {} operation(s) completed.",
            self.total_operations()
        );
        Ok(())
    }
}
