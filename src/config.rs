//! Configuration module for nxos-pim
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/nxos-pim/config.toml)
//! - User configuration (~/.nxos-pim.toml)
//! - Project configuration (./nxos-pim.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default run settings
    pub defaults: Defaults,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Device snapshot settings
    pub device: DeviceConfig,

    /// Colors and output settings
    pub colors: ColorsConfig,
}

/// Default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Report changes without pushing them
    pub check_mode: bool,

    /// Show a configuration diff
    pub diff_mode: bool,

    /// Output format (human, json, yaml)
    pub output: String,

    /// Write pushed commands back into the running-config file
    pub write_back: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            check_mode: false,
            diff_mode: false,
            output: "human".to_string(),
            write_back: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log path
    pub log_path: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// Log format (pretty, compact, json, full)
    pub log_format: String,

    /// Log timestamp
    pub log_timestamp: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: "warn".to_string(),
            log_format: "compact".to_string(),
            log_timestamp: true,
        }
    }
}

/// Device snapshot settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Default running-config file
    pub running_config: Option<PathBuf>,

    /// Name reported for the device in logs and output
    pub name: Option<String>,

    /// Canned exec-mode outputs, keyed by command
    pub command_outputs: HashMap<String, String>,
}

/// Colors and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colored output
    pub enabled: bool,

    /// OK color
    pub ok: String,

    /// Changed color
    pub changed: String,

    /// Error color
    pub error: String,

    /// Diff add color
    pub diff_add: String,

    /// Diff remove color
    pub diff_remove: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ok: "green".to_string(),
            changed: "yellow".to_string(),
            error: "red".to_string(),
            diff_add: "green".to_string(),
            diff_remove: "red".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        // Load from standard locations
        let config_paths = Self::get_config_paths(config_path);

        for path in config_paths {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        // Apply environment variable overrides
        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push(path.clone());
            return paths;
        }

        // Environment variable
        if let Ok(env_config) = std::env::var("NXOS_PIM_CONFIG") {
            paths.push(PathBuf::from(env_config));
            return paths;
        }

        // System-wide config
        paths.push(PathBuf::from("/etc/nxos-pim/config.toml"));

        // User config
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".nxos-pim.toml"));
        }

        // Project config (current directory)
        paths.push(PathBuf::from("nxos-pim.toml"));

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // Determine format based on extension
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one
    fn merge(&self, other: Config) -> Config {
        let defaults = Defaults::default();
        Config {
            defaults: Defaults {
                check_mode: other.defaults.check_mode || self.defaults.check_mode,
                diff_mode: other.defaults.diff_mode || self.defaults.diff_mode,
                output: if other.defaults.output != defaults.output {
                    other.defaults.output
                } else {
                    self.defaults.output.clone()
                },
                write_back: other.defaults.write_back || self.defaults.write_back,
            },
            logging: LoggingConfig {
                log_path: other
                    .logging
                    .log_path
                    .or_else(|| self.logging.log_path.clone()),
                ..other.logging
            },
            device: DeviceConfig {
                running_config: other
                    .device
                    .running_config
                    .or_else(|| self.device.running_config.clone()),
                name: other.device.name.or_else(|| self.device.name.clone()),
                command_outputs: {
                    let mut outputs = self.device.command_outputs.clone();
                    outputs.extend(other.device.command_outputs);
                    outputs
                },
            },
            colors: other.colors,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // NXOS_PIM_CHECK
        if let Ok(value) = std::env::var("NXOS_PIM_CHECK") {
            self.defaults.check_mode = is_truthy(&value);
        }

        // NXOS_PIM_DIFF
        if let Ok(value) = std::env::var("NXOS_PIM_DIFF") {
            self.defaults.diff_mode = is_truthy(&value);
        }

        // NXOS_PIM_OUTPUT
        if let Ok(output) = std::env::var("NXOS_PIM_OUTPUT") {
            self.defaults.output = output;
        }

        // NXOS_PIM_RUNNING_CONFIG
        if let Ok(path) = std::env::var("NXOS_PIM_RUNNING_CONFIG") {
            self.device.running_config = Some(PathBuf::from(path));
        }

        // NXOS_PIM_LOG_LEVEL
        if let Ok(level) = std::env::var("NXOS_PIM_LOG_LEVEL") {
            self.logging.log_level = level;
        }

        // NXOS_PIM_LOG_FORMAT
        if let Ok(format) = std::env::var("NXOS_PIM_LOG_FORMAT") {
            self.logging.log_format = format;
        }

        // NXOS_PIM_LOG_PATH
        if let Ok(path) = std::env::var("NXOS_PIM_LOG_PATH") {
            self.logging.log_path = Some(PathBuf::from(path));
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() || std::env::var("NXOS_PIM_NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }
    }

    /// Get the configured running-config file
    pub fn running_config(&self) -> Option<&PathBuf> {
        self.device.running_config.as_ref()
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        Config::default().merge_from_file(&path_buf)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
