//! Manifest container and capability declaration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RollupOptions;
use crate::error::SkipRecord;
use crate::node::Node;

/// Manifest format version written by this crate.
pub const MANIFEST_VERSION: &str = "0.3";

/// Statistical guarantees a manifest claims for its rollups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupCapabilities {
    // Size-related
    #[serde(default)]
    pub size_stats: bool,
    #[serde(default)]
    pub size_percentiles: bool,
    #[serde(default)]
    pub size_buckets: bool,

    // Time-related
    #[serde(default)]
    pub activity_span: bool,

    // Structure-related
    #[serde(default)]
    pub dir_counts: bool,
    #[serde(default)]
    pub depth_stats: bool,
    #[serde(default)]
    pub depth_metrics: bool,

    // Content-related
    #[serde(default)]
    pub extension_counts: bool,
    #[serde(default)]
    pub file_types: bool,
}

impl RollupCapabilities {
    pub const SIZE_STATS: &'static str = "size_stats";
    pub const SIZE_PERCENTILES: &'static str = "size_percentiles";
    pub const SIZE_BUCKETS: &'static str = "size_buckets";
    pub const ACTIVITY_SPAN: &'static str = "activity_span";
    pub const DIR_COUNTS: &'static str = "dir_counts";
    pub const DEPTH_STATS: &'static str = "depth_stats";
    pub const DEPTH_METRICS: &'static str = "depth_metrics";
    pub const EXTENSION_COUNTS: &'static str = "extension_counts";
    pub const FILE_TYPES: &'static str = "file_types";

    /// Derive the declaration from the metric families that were computed.
    pub fn from_options(options: &RollupOptions) -> Self {
        Self {
            size_stats: options.size_bytes,
            size_percentiles: options.size_bytes && options.percentiles,
            size_buckets: options.size_bytes && options.size_buckets,
            activity_span: options.activity_span,
            dir_counts: options.dir_counts,
            depth_stats: options.depth_stats,
            depth_metrics: options.depth_stats,
            extension_counts: options.file_types,
            file_types: options.file_types,
        }
    }

    /// Every capability by name, in name order.
    pub fn declared(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            (Self::SIZE_STATS, self.size_stats),
            (Self::SIZE_PERCENTILES, self.size_percentiles),
            (Self::SIZE_BUCKETS, self.size_buckets),
            (Self::ACTIVITY_SPAN, self.activity_span),
            (Self::DIR_COUNTS, self.dir_counts),
            (Self::DEPTH_STATS, self.depth_stats),
            (Self::DEPTH_METRICS, self.depth_metrics),
            (Self::EXTENSION_COUNTS, self.extension_counts),
            (Self::FILE_TYPES, self.file_types),
        ])
    }

    /// Whether any capability is declared.
    pub fn any(&self) -> bool {
        self.declared().values().any(|enabled| *enabled)
    }
}

/// Capability declarations, grouped by subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub rollup: RollupCapabilities,
}

/// Tool that produced a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorMeta {
    pub name: String,
    pub version: String,
}

impl Default for GeneratorMeta {
    fn default() -> Self {
        Self {
            name: "dirmanifest".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Schema identifiers for the node and rollup layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMeta {
    pub node: String,
    pub rollup: String,
}

impl Default for SchemaMeta {
    fn default() -> Self {
        Self {
            node: "node.v1".to_string(),
            rollup: "rollup.v1".to_string(),
        }
    }
}

/// Manifest header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMeta {
    /// Format version.
    pub version: String,

    /// Producing tool.
    #[serde(default)]
    pub generator: GeneratorMeta,

    /// Layout identifiers.
    #[serde(default)]
    pub schema: SchemaMeta,

    /// Root path that was scanned.
    pub root: PathBuf,

    /// When the manifest was generated.
    pub generated_at: DateTime<Utc>,

    /// Declared guarantees.
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl ManifestMeta {
    /// Create a header for a fresh manifest of `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            generator: GeneratorMeta::default(),
            schema: SchemaMeta::default(),
            root: root.into(),
            generated_at: Utc::now(),
            capabilities: Capabilities::default(),
        }
    }
}

/// A directory-tree manifest: header, flat node list and skip records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Header, including the capability declaration.
    #[serde(rename = "manifest")]
    pub meta: ManifestMeta,

    /// Every recorded entry.
    pub nodes: Vec<Node>,

    /// Entries the traversal left out.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkipRecord>,
}

impl Manifest {
    /// Create a manifest with no declared capabilities.
    pub fn new(root: impl Into<PathBuf>, nodes: Vec<Node>, skipped: Vec<SkipRecord>) -> Self {
        Self {
            meta: ManifestMeta::new(root),
            nodes,
            skipped,
        }
    }

    /// Declared rollup capabilities.
    pub fn rollup_capabilities(&self) -> &RollupCapabilities {
        &self.meta.capabilities.rollup
    }

    /// Find a node by path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.path == path)
    }

    /// Iterate directory nodes.
    pub fn directories(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_dir)
    }

    /// Number of file nodes.
    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_file()).count()
    }

    /// Number of directory nodes.
    pub fn dir_count(&self) -> usize {
        self.directories().count()
    }

    /// Check if the traversal skipped anything.
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}
