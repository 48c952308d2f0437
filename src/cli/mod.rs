//! Command-line interface for namelock.
//!
//! # Commands
//!
//! - `simulate` - run contending workers against one named lock and report
//!   which ones ran and which were dropped by timeout or overflow eviction
//! - `config` - show, create or locate the registry configuration file
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging on stderr
//! - `--quiet` / `-q` - no logging
//! - `--config <path>` / `-c` - configuration file (default `~/.namelock/config.toml`,
//!   or `NAMELOCK_CONFIG_PATH`)
//!
//! `RUST_LOG`, when set, overrides the level chosen by the flags.

mod config;
mod simulate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging.
    pub log_level: Option<String>,

    /// Explicit configuration file path.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create an empty configuration (logging off, default config path).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Top-level command-line arguments.
#[derive(Parser)]
#[command(
    name = "namelock",
    about = "Named async critical sections - simulate contention and manage lock options",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable all logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run contending workers against one named lock
    Simulate(simulate::SimulateCommand),

    /// Manage the registry configuration file
    Config(config::ConfigCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Derive [`CliConfig`] from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("namelock=debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("namelock=warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the parsed command with an explicit [`CliConfig`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Simulate(cmd) => cmd.execute(config.config_path).await,
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
        }
    }
}
