//! ZİRAVE CLI - plant disease diagnosis and farming advice from Gemini.
//!
//! Every analysis command prints one JSON record on stdout. Failures of the
//! remote call are reported inside that record (`error` key); only missing
//! configuration makes the command itself fail.
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY=...
//!
//! # Diagnose from symptoms
//! zirave symptoms --plant tomato "yellow leaves" "brown spots" --season summer
//!
//! # Diagnose from a photo
//! zirave image leaf.jpg --plant tomato
//!
//! # Ask a question
//! zirave advice "When should I prune olive trees?"
//!
//! # View configuration
//! zirave config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zirave_core::Config;

mod cli;
mod logging;

/// ZİRAVE - plant disease diagnosis and farming advice.
#[derive(Parser, Debug)]
#[command(name = "zirave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "ZIRAVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Diagnose a plant from a list of symptoms
    Symptoms(cli::analyze::SymptomsArgs),

    /// Diagnose a plant from a photo
    Image(cli::analyze::ImageArgs),

    /// Ask a free-form agricultural question
    Advice(cli::analyze::AdviceArgs),

    /// Report whether a Gemini credential is configured
    Status,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An explicit --config must load; the default location may be absent or
    // broken. Logging isn't initialized yet, so use eprintln for warnings.
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `zirave config path`."
                );
                Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("ZİRAVE v{}", zirave_core::VERSION);

    match cli.command {
        Commands::Symptoms(args) => cli::analyze::symptoms(args, &config).await,
        Commands::Image(args) => cli::analyze::image(args, &config).await,
        Commands::Advice(args) => cli::analyze::advice(args, &config).await,
        Commands::Status => cli::analyze::status(&config).await,
        Commands::Config(args) => cli::config::execute(args, &config).await,
    }
}
