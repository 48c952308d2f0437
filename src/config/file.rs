//! Registry configuration file (`~/.namelock/config.toml`).
//!
//! The file holds default options applied to every lock and per-name presets
//! layered on top of the defaults when a lock is first created:
//!
//! ```toml
//! [defaults]
//! max_queue_size = "unbounded"
//! overflow_strategy = "this"
//!
//! [locks.payments]
//! max_queue_size = 8
//! overflow_strategy = "first"
//! ```
//!
//! The location can be overridden with the `NAMELOCK_CONFIG_PATH` environment
//! variable.

use super::options::{LockOptions, LockOptionsPatch, OverflowStrategy, QueueLimit};
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration for a [`crate::LockRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Options every lock starts with.
    pub defaults: LockOptions,

    /// Per-name presets merged over `defaults` when the lock is created.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub locks: BTreeMap<String, LockOptionsPatch>,
}

impl RegistryConfig {
    /// Load from `path` when given, otherwise from the default location.
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if let Some(name) = config.locks.keys().find(|name| name.is_empty()) {
            anyhow::bail!("Lock preset name must not be empty (found {name:?})");
        }
        Ok(config)
    }

    /// Save the configuration, creating parent directories as needed.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Location of the configuration file.
    ///
    /// `NAMELOCK_CONFIG_PATH` wins; otherwise `~/.namelock/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Effective options for a freshly created lock called `name`.
    pub fn options_for(&self, name: &str) -> LockOptions {
        match self.locks.get(name) {
            Some(preset) => self.defaults.merge(preset),
            None => self.defaults,
        }
    }

    /// Add or replace the preset for `name`.
    pub fn set_preset(&mut self, name: impl Into<String>, preset: LockOptionsPatch) {
        self.locks.insert(name.into(), preset);
    }

    /// Example configuration written by `namelock config init`.
    pub fn init_example() -> Self {
        let mut config = Self::default();
        if let Ok(limit) = QueueLimit::bounded(16) {
            config.set_preset(
                "example",
                LockOptionsPatch::new()
                    .max_queue_size(limit)
                    .overflow_strategy(OverflowStrategy::First),
            );
        }
        config
    }
}
