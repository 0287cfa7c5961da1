//! Metamorph CLI - check family manifests and walk through a morph demo
//!
//! - `check` registers every family in a manifest and reports which variants
//!   honour their root's contract
//! - `demo` builds a small family in code and morphs an instance through it

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

pub use error::{CliError, CliResult};
pub use output::OutputFormat;

/// Metamorph CLI application
#[derive(Parser)]
#[command(name = "metamorph")]
#[command(about = "Metamorph - runtime type family checker", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Validate every variant in a family manifest against its root
    Check {
        /// Manifest file (.toml or .json)
        manifest: PathBuf,

        /// Policy file applied to every family in the manifest
        #[arg(short, long, env = "METAMORPH_POLICY")]
        policy: Option<PathBuf>,
    },

    /// Run the Animal/Dog/Cat walkthrough
    Demo,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so json output stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Check { manifest, policy } => {
            commands::check::execute(&manifest, policy.as_deref(), cli.output)
        }
        Commands::Demo => commands::demo::execute(cli.output),
    }
}
