use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod cache;
mod check;
mod clean;
mod config;
mod init;
mod load;
mod query;
mod stats;
mod syntax;
mod tree;

use check::run_check;
use clean::clean;
use config::Config;
use init::init_config;
use load::LoadContext;
use query::{run_query, run_shell};
use stats::run_stats;
use tree::run_tree;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "doxq")]
#[command(about = "Query Doxygen's search index from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Force reparse (ignore cache)
    #[arg(short, long, global = true)]
    force: bool,

    /// Documentation directory (overrides docs_dir from doxq.toml)
    #[arg(short, long, global = true)]
    docs: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the index for a term
    Query {
        /// Term to look for (matched as a substring of index keys)
        term: String,

        /// Restrict to one section (all, classes, namespaces, files, functions, ...)
        #[arg(short, long)]
        section: Option<String>,

        /// Maximum results to print (overrides limit from doxq.toml)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Exact key lookup instead of substring search
        #[arg(short, long)]
        exact: bool,
    },
    /// Interactive search shell
    Shell,
    /// Validate the index files and report problems
    Check,
    /// Show the scopes the index refers to as a tree
    Tree {
        /// Only show this scope (e.g. AIToolbox::MDP)
        prefix: Option<String>,
    },
    /// Show index totals and per-section counts
    Stats,
    /// Remove the parsed-index cache
    Clean,
    /// Initialize a new doxq.toml configuration file
    Init {
        /// Overwrite existing doxq.toml if present
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let mut config = Config::load();

    // CLI flag overrides config file
    if let Some(docs) = cli.docs {
        config.docs_dir = docs;
    }

    let ctx = LoadContext {
        config: config.clone(),
        verbose: cli.verbose,
        force: cli.force,
    };

    let result = match cli.command {
        Commands::Query {
            term,
            section,
            limit,
            exact,
        } => run_query(&ctx, &term, section.as_deref(), limit, exact),
        Commands::Shell => run_shell(&ctx),
        Commands::Check => run_check(&ctx),
        Commands::Tree { prefix } => run_tree(&ctx, prefix.as_deref()),
        Commands::Stats => run_stats(&ctx),
        Commands::Clean => clean(&config),
        Commands::Init { force } => init_config(force),
    };

    if let Err(e) = result {
        eprintln!("\n{} {}", "❌".red(), e.red());
        std::process::exit(1);
    }
}
