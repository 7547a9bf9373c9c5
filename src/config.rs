//! TOML configuration for the dirmanifest binary.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! a full scan with every rollup family enabled and validation on.
//!
//! ```toml
//! [scanner]
//! root = "."
//! ignore_patterns = [".git", "target"]
//!
//! [rollup]
//! enabled = true
//! percentiles = false
//!
//! [validate]
//! enabled = true
//!
//! [output]
//! file = "manifest.json"
//! format = "yaml"
//! ```

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use dirmanifest_core::{RollupOptions, ScanConfig};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScanConfig,
    pub rollup: RollupSettings,
    pub validate: ValidateSettings,
    pub output: OutputSettings,
}

/// `[rollup]` table: an on/off switch plus the metric families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(flatten)]
    pub options: RollupOptions,
}

impl Default for RollupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            options: RollupOptions::default(),
        }
    }
}

/// `[validate]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ValidateSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// `[output]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Manifest destination; stdout when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub format: OutputFormat,

    /// Indent JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            file: None,
            format: OutputFormat::default(),
            pretty: true,
        }
    }
}

/// Manifest serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("Invalid config {}", path.display()))
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.rollup.options.ensure_consistent()?;
        Ok(config)
    }

    /// Rollup options adjusted to what the scanner collects. Without
    /// timestamps there is no activity span to claim.
    pub fn rollup_options(&self) -> RollupOptions {
        let mut options = self.rollup.options;
        if !self.scanner.collect_timestamps {
            options.activity_span = false;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();

        assert_eq!(config.scanner.root, PathBuf::from("."));
        assert!(config.scanner.include_hidden);
        assert!(config.rollup.enabled);
        assert_eq!(config.rollup.options, RollupOptions::default());
        assert!(config.validate.enabled);
        assert!(config.output.file.is_none());
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_tables() {
        let config = AppConfig::parse(
            r#"
            [scanner]
            ignore_patterns = ["target", "*.log"]
            threads = 4

            [rollup]
            percentiles = false
            size_buckets = false

            [output]
            file = "out.yaml"
            format = "yaml"
            "#,
        )
        .unwrap();

        assert_eq!(config.scanner.root, PathBuf::from("."));
        assert_eq!(config.scanner.ignore_patterns, vec!["target", "*.log"]);
        assert_eq!(config.scanner.threads, 4);
        assert!(config.rollup.enabled);
        assert!(config.rollup.options.size_bytes);
        assert!(!config.rollup.options.percentiles);
        assert_eq!(config.output.file, Some(PathBuf::from("out.yaml")));
        assert_eq!(config.output.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_inconsistent_rollup_rejected() {
        let err = AppConfig::parse(
            r#"
            [rollup]
            size_bytes = false
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_activity_span_needs_timestamps() {
        let config = AppConfig::parse(
            r#"
            [scanner]
            collect_timestamps = false
            "#,
        )
        .unwrap();

        assert!(config.rollup.options.activity_span);
        assert!(!config.rollup_options().activity_span);
    }
}
