//! xtask for tree-sitter-tempo - development tasks
//!
//! Usage: `cargo xtask <command>`
//!
//! Commands:
//! - `lint` - Validate grammar definitions
//! - `gen \[name\]` - Regenerate parser sources with `tree-sitter generate`

mod generate;
mod lint;
mod metadata;
mod plan;
mod tool;
mod util;

use facet::Facet;
use facet_args as args;
use owo_colors::OwoColorize;

/// tree-sitter-tempo development tasks
#[derive(Debug, Facet)]
struct Args {
    #[facet(args::subcommand)]
    command: Command,
}

/// Available commands
#[derive(Debug, Facet)]
#[repr(u8)]
#[allow(dead_code)] // variants used by facet_args derive
enum Command {
    /// Print version information
    Version,

    /// Validate all grammar definitions
    Lint {
        /// Strict mode: missing generated files (parser.c) are errors.
        /// Without this flag, they're warnings (useful before running gen).
        #[facet(args::named, default)]
        strict: bool,
    },

    /// Regenerate grammar/src/ in def/ and crate/ with tree-sitter generate
    Gen {
        /// Optional grammar name to regenerate (regenerates all if omitted)
        #[facet(args::positional, default)]
        name: Option<String>,

        /// Show what would be done without making changes
        #[facet(args::named, default)]
        dry_run: bool,
    },
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))
    .ok();

    tracing_subscriber::fmt::init();

    let args: Args = facet_args::from_std_args().unwrap_or_else(|e| {
        eprintln!("{:?}", miette::Report::new(e));
        std::process::exit(1);
    });

    // Handle version early - doesn't need repo root
    if matches!(args.command, Command::Version) {
        println!("tempo-xtask {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let Some(repo_root) = util::find_repo_root() else {
        eprintln!("{}", "Could not find repo root (no Cargo.toml with [workspace])".red());
        std::process::exit(1);
    };
    let langs_dir = repo_root.join("langs");

    match args.command {
        Command::Version => unreachable!(),
        Command::Lint { strict } => {
            let options = lint::LintOptions { strict };
            if let Err(e) = lint::run_lints(&langs_dir, options) {
                eprintln!("{:?}", e);
                std::process::exit(1);
            }
        }
        Command::Gen { name, dry_run } => {
            if !tool::check_tools_or_report(tool::GEN_TOOLS) {
                std::process::exit(1);
            }

            let options = generate::GenerateOptions {
                name: name.as_deref(),
            };
            let plans = match generate::plan_generate(&langs_dir, options) {
                Ok(plans) => plans,
                Err(e) => {
                    eprintln!("{:?}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = plans.run(dry_run) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }

            // Run strict lint after generation (now parser.c should exist)
            if !dry_run {
                println!();
                println!(
                    "{}",
                    "Running post-generation lint (strict)...".cyan().bold()
                );
                let options = lint::LintOptions { strict: true };
                if let Err(e) = lint::run_lints(&langs_dir, options) {
                    eprintln!("{:?}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
