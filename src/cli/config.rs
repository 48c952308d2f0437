//! `namelock config`: inspect and create the registry configuration file.

use crate::config::RegistryConfig;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

/// Arguments of `namelock config`.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (default)
    Show,

    /// Print the configuration file location
    Path,
}

impl ConfigCommand {
    /// Run the selected subcommand against `config_path` (or the default location).
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let path = match config_path {
            Some(path) => path,
            None => RegistryConfig::default_path()?,
        };

        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(path, force).await,
            Some(ConfigSubcommands::Show) | None => Self::show(path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", path.display());
                Ok(())
            }
        }
    }

    async fn init(path: PathBuf, force: bool) -> Result<()> {
        if path.exists() && !force {
            println!("❌ Config already exists at: {}", path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = RegistryConfig::init_example();
        config.save_to(&path).await?;
        tracing::info!("Wrote example config to {}", path.display());

        println!("✅ Created config at: {}", path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }

    async fn show(path: PathBuf) -> Result<()> {
        let exists = path.exists();
        let config = RegistryConfig::load_with_optional(Some(path.clone())).await?;

        println!("{}", "namelock configuration".bold());
        println!("Location: {}", path.display());
        if !exists {
            println!("{}", "(file not found, showing defaults)".yellow());
        }
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        Ok(())
    }
}
