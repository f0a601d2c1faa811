mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rigcheck",
    about = "Find stalled work across a rig town's worker record stores",
    version,
    propagate_version = true
)]
struct Cli {
    /// Town root (default: auto-detect from .rigcheck/ or mayor/)
    #[arg(long, global = true, env = "RIGCHECK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report attached work that has not been updated within the threshold
    Stale {
        /// Only check this rig (skips rig discovery)
        #[arg(long)]
        rig: Option<String>,

        /// Staleness threshold, e.g. 30m or 2h (overrides config)
        #[arg(long)]
        threshold: Option<String>,
    },

    /// List the rigs and worker stores a scan would visit
    Rigs {
        /// Only list this rig
        #[arg(long)]
        rig: Option<String>,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Stale { rig, threshold } => {
            cmd::stale::run(&root, rig.as_deref(), threshold.as_deref(), cli.json)
        }
        Commands::Rigs { rig } => cmd::rigs::run(&root, rig.as_deref(), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
