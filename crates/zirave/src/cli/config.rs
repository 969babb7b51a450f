//! `zirave config`: inspect the effective settings or write a starter file.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::Path;
use zirave_core::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML (literal API keys are masked)
    Show {
        /// Print the built-in defaults instead of the loaded file
        #[arg(long)]
        defaults: bool,
    },

    /// Print where the config file is looked up
    Path,

    /// Write the default configuration, prompts included, to the config path
    Init {
        /// Replace a file that is already there
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(args: ConfigArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { defaults } => {
            let shown = if defaults { Config::default() } else { config.clone() };
            print!("{}", render(&shown)?);
        }
        ConfigCommand::Path => println!("{}", Config::default_path().display()),
        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            write_starter(&path, force)?;
            tracing::info!(path = %path.display(), "Wrote starter config");
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// TOML for display, with any literal credential masked.
fn render(config: &Config) -> anyhow::Result<String> {
    Ok(config.redacted().to_toml()?)
}

fn write_starter(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to replace it",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(path, Config::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
