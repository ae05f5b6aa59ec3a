mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reviewd",
    about = "Change-risk review engine — measure changes, run checks, rank risky files",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .reviewd.yaml or .git/)
    #[arg(long, global = true, env = "REVIEWD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full review pipeline over pending changes
    Review {
        /// Restrict the review to these paths (default: all pending changes)
        paths: Vec<String>,

        /// Cap on the critical-files top list
        #[arg(long)]
        max_files: Option<usize>,

        /// Skip critical-file selection entirely
        #[arg(long)]
        no_critical: bool,
    },

    /// Show pending per-file change statistics
    Changes,

    /// Show the import fan-in histogram
    Fanin {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Classify the pending change set into a review tier
    Tier,

    /// List registered quality-check tools and their status
    Tools,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Review {
            paths,
            max_files,
            no_critical,
        } => cmd::review::run(&root, paths, max_files, no_critical, cli.json),
        Commands::Changes => cmd::changes::run(&root, cli.json),
        Commands::Fanin { top } => cmd::fanin::run(&root, top, cli.json),
        Commands::Tier => cmd::tier::run(&root, cli.json),
        Commands::Tools => cmd::tools::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
