//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.outreach.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".outreach.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analytics settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Chart output settings.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding the CSV files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            verbose: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Days ahead shown by `upcoming`.
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,

    /// Maximum tags and keywords listed in reports.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            upcoming_days: default_upcoming_days(),
            top_n: default_top_n(),
        }
    }
}

fn default_upcoming_days() -> u32 {
    7
}

fn default_top_n() -> usize {
    10
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Write charts during `analytics`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Subdirectory of the data directory for chart files.
    #[serde(default = "default_figures_dir")]
    pub figures_dir: String,

    /// Render the technology tag cloud.
    #[serde(default = "default_true")]
    pub tag_cloud: bool,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            figures_dir: default_figures_dir(),
            tag_cloud: true,
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_figures_dir() -> String {
    "figures".to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    480
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.general.data_dir = data_dir.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Directory where chart files are written.
    pub fn figures_dir(&self) -> PathBuf {
        self.general.data_dir.join(&self.charts.figures_dir)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.data_dir, PathBuf::from("data"));
        assert_eq!(config.analytics.upcoming_days, 7);
        assert!(config.charts.enabled);
        assert_eq!(config.figures_dir(), PathBuf::from("data").join("figures"));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
data_dir = "tracking"
verbose = true

[analytics]
upcoming_days = 14

[charts]
tag_cloud = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.data_dir, PathBuf::from("tracking"));
        assert!(config.general.verbose);
        assert_eq!(config.analytics.upcoming_days, 14);
        assert_eq!(config.analytics.top_n, 10);
        assert!(!config.charts.tag_cloud);
        assert_eq!(config.charts.figures_dir, "figures");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analytics]"));
        assert!(toml_str.contains("[charts]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[analytics]\ntop_n = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.analytics.top_n, 3);

        std::fs::write(&path, "[analytics\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
