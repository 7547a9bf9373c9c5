//! Scan and rollup configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::RollupError;

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Patterns to ignore (glob syntax, matched against entry names).
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Patterns that keep an entry even when an ignore pattern matches it.
    #[builder(default)]
    #[serde(default)]
    pub allow_patterns: Vec<String>,

    /// Number of threads for scanning (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Record inode numbers.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub collect_inodes: bool,

    /// Record modification times.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub collect_timestamps: bool,

    /// Record immediate file counts on directories.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub collect_file_counts: bool,
}

fn default_true() -> bool {
    true
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
            max_depth: None,
            ignore_patterns: Vec::new(),
            allow_patterns: Vec::new(),
            threads: 0,
            include_hidden: true,
            collect_inodes: true,
            collect_timestamps: true,
            collect_file_counts: true,
        }
    }

    /// Check if hidden files should be skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        !self.include_hidden && name.starts_with('.')
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Which metric families the rollup aggregator computes.
///
/// Percentiles and size buckets refine size statistics and require
/// `size_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RollupOptions {
    /// Count descendant directories.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub dir_counts: bool,

    /// Aggregate file sizes.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub size_bytes: bool,

    /// Build the extension histogram.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub file_types: bool,

    /// Compute p50/p90/p99 and pin the median to p50.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub percentiles: bool,

    /// Fill the four-way size histogram.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub size_buckets: bool,

    /// Compute subtree depth metrics.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub depth_stats: bool,

    /// Claim activity-span guarantees for `last_modified`. Needs
    /// timestamps from the traversal.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub activity_span: bool,
}

fn check_size_refinements(
    size_bytes: bool,
    percentiles: bool,
    size_buckets: bool,
) -> Result<(), String> {
    if percentiles && !size_bytes {
        return Err("percentiles require size_bytes".to_string());
    }
    if size_buckets && !size_bytes {
        return Err("size_buckets require size_bytes".to_string());
    }
    Ok(())
}

impl RollupOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        check_size_refinements(
            self.size_bytes.unwrap_or(true),
            self.percentiles.unwrap_or(true),
            self.size_buckets.unwrap_or(true),
        )
    }
}

impl RollupOptions {
    /// Create a new options builder.
    pub fn builder() -> RollupOptionsBuilder {
        RollupOptionsBuilder::default()
    }

    /// Options with every metric family disabled.
    pub fn none() -> Self {
        Self {
            dir_counts: false,
            size_bytes: false,
            file_types: false,
            percentiles: false,
            size_buckets: false,
            depth_stats: false,
            activity_span: false,
        }
    }

    /// Reject contradictory options (for values that did not go through
    /// the builder, e.g. deserialized config).
    pub fn ensure_consistent(&self) -> Result<(), RollupError> {
        check_size_refinements(self.size_bytes, self.percentiles, self.size_buckets)
            .map_err(|message| RollupError::InvalidOptions { message })
    }
}

impl Default for RollupOptions {
    fn default() -> Self {
        Self {
            dir_counts: true,
            size_bytes: true,
            file_types: true,
            percentiles: true,
            size_buckets: true,
            depth_stats: true,
            activity_span: true,
        }
    }
}
