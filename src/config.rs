//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving persisted rename
//! defaults in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cluster::Threshold;
use crate::constants::APP_BINARY_NAME;
use crate::rename::{NameTemplate, SecondaryKey, StrategyOptions, DEFAULT_PATTERN, DEFAULT_WIDTH};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "ESXKIT_CONFIG_DIR";

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/esxkit/config.toml`
/// - macOS: `~/Library/Application Support/esxkit/config.toml`
/// - Windows: `%APPDATA%\esxkit\config.toml`
///
/// `ESXKIT_CONFIG_DIR` replaces the directory part.
///
/// # Example
///
/// ```toml
/// [rename]
/// strategy = "tag-rows"
/// tag = "Building"
/// divisor = 25.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for `rename`; command-line flags override them
    pub rename: StrategyOptions,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_BINARY_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read config file: {}", config_path.display())
        })?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<PathBuf> {
        self.validate()?;

        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, &config_path).with_context(|| {
            format!("Failed to rename temp config file to: {}", config_path.display())
        })?;

        Ok(config_path)
    }

    /// Validates configuration values.
    ///
    /// Checks each value on its own. Settings that only make sense together
    /// with command-line flags (e.g. `tag-rows` without a tag) are accepted
    /// here and rejected when a run resolves its strategy.
    pub fn validate(&self) -> Result<()> {
        let rename = &self.rename;

        if rename.divisor.is_some() && rename.pixels.is_some() {
            anyhow::bail!("[rename] sets both 'divisor' and 'pixels'; keep only one");
        }
        if let Some(divisor) = rename.divisor {
            Threshold::FloorFraction { divisor }.validate()?;
        }
        if let Some(pixels) = rename.pixels {
            Threshold::Absolute { pixels }.validate()?;
        }

        NameTemplate::parse(
            rename.pattern.as_deref().unwrap_or(DEFAULT_PATTERN),
            rename.width.unwrap_or(DEFAULT_WIDTH),
        )?;

        for key in rename.within.iter().flatten() {
            key.parse::<SecondaryKey>()?;
        }

        if let Some(tag) = &rename.tag {
            if tag.trim().is_empty() {
                anyhow::bail!("[rename] 'tag' must not be empty");
            }
        }

        Ok(())
    }
}
