//! Configuration file handling.
//!
//! This module provides loading and saving of pkgaudit configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/pkgaudit/config.toml`
//! - macOS: `~/Library/Application Support/pkgaudit/config.toml`
//! - Windows: `%APPDATA%\pkgaudit\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! executables_only = true
//! export_path = "system_packages.json"
//! adapter_timeout_secs = 30
//! parallel = true
//! disabled_managers = ["brew"]
//!
//! [ignore]
//! packages = ["pip", "setuptools*"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Manager;
use crate::platform::config_dir;

/// Application configuration.
///
/// Every field has a default, so a partial file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether reports only show packages that look like CLI tools.
    ///
    /// `--all` and `--executables` override this per run.
    /// Default: true
    pub executables_only: bool,

    /// File written by `--json` when no `--output` is given.
    ///
    /// Default: "system_packages.json"
    pub export_path: String,

    /// How long a single package manager may take before it is skipped.
    ///
    /// Default: 30 seconds
    pub adapter_timeout_secs: u64,

    /// Whether package managers are queried concurrently.
    ///
    /// Default: true
    pub parallel: bool,

    /// Python interpreter used to run pip. Defaults to `python3`
    /// (`python` on Windows) when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,

    /// Managers never queried, by id (e.g. "npm", "brew").
    pub disabled_managers: Vec<String>,

    /// Packages hidden from reports and exports.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Configuration for hiding specific packages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Package names to exclude from results.
    ///
    /// Supports glob patterns (e.g., "setuptools*", "@types/*").
    pub packages: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a package should be ignored.
    pub fn should_ignore_package(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    let first = parts[0];
    if !remaining.starts_with(first) {
        return false;
    }
    remaining = &remaining[first.len()..];

    let last = parts[parts.len() - 1];
    if remaining.len() < last.len() || !remaining.ends_with(last) {
        return false;
    }
    remaining = &remaining[..remaining.len() - last.len()];

    for part in parts[1..parts.len() - 1].iter().filter(|p| !p.is_empty()) {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executables_only: true,
            export_path: "system_packages.json".to_string(),
            adapter_timeout_secs: 30,
            parallel: true,
            python: None,
            disabled_managers: Vec::new(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Whether `manager` is listed in `disabled_managers`.
    ///
    /// Entries are matched by manager id, so `homebrew` disables `brew`.
    pub fn is_manager_disabled(&self, manager: Manager) -> bool {
        self.disabled_managers
            .iter()
            .any(|entry| Manager::parse(entry) == Some(manager))
    }
}
