//! Configuration file handling for the bluelink CLI

use anyhow::{Context, Result};
use bluelink_client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Configuration for the CLI tool
///
/// Credentials are not read from this file; they come from
/// flags or the `BLUELINK_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Service origin override
    pub base_url: Option<String>,
    /// Default output format ("table" or "json")
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("bluelink");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, output: Option<OutputFormat>, no_color: bool) -> MergedConfig {
        let output = output
            .or_else(|| self.output.as_deref().and_then(OutputFormat::from_name))
            .unwrap_or_default();

        MergedConfig {
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output,
            no_color: no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub base_url: String,
    pub output: OutputFormat,
    pub no_color: bool,
}
