//! CLI for the ULV URL liveness validator.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ulv_core::config;

use commands::{run_check, run_config};

/// Top-level CLI for the ULV liveness validator.
#[derive(Debug, Parser)]
#[command(name = "ulv")]
#[command(about = "ULV: cache-aware batch URL liveness validator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Validate a batch of URLs and report each as ok or broken.
    Check {
        /// URLs to validate.
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line ('#' comments).
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Print outcomes as JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// Override the per-probe timeout in milliseconds.
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Override the number of probes in flight per window.
        #[arg(long, value_name = "N")]
        max_concurrent: Option<usize>,
    },

    /// Show the effective configuration and where it is loaded from.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Check {
                urls,
                file,
                json,
                timeout_ms,
                max_concurrent,
            } => {
                if let Some(ms) = timeout_ms {
                    cfg.timeout_ms = ms;
                }
                if let Some(n) = max_concurrent {
                    cfg.max_concurrent = n;
                }
                run_check(&cfg, urls, file.as_deref(), json)?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
