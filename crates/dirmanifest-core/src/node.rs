//! Manifest node and rollup types.

use std::collections::BTreeMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::path;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single file or directory entry of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Path relative to the scan root, `/`-separated, `"."` for the root.
    pub path: String,

    /// Whether this entry is a directory.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_dir: bool,

    /// Inode number, when the traversal collected it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inode: Option<u64>,

    /// Modification time in unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime_unix: Option<i64>,

    /// Size in bytes (files only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Number of files directly inside this directory, as seen by the
    /// traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,

    /// Number of directories directly inside this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_subdir_count: Option<u64>,

    /// Aggregate statistics over the subtree (directories only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollup: Option<Rollup>,
}

impl Node {
    /// Create a file node.
    pub fn new_file(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes: Some(size_bytes),
            ..Self::default()
        }
    }

    /// Create a directory node.
    pub fn new_directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            ..Self::default()
        }
    }

    /// Set the modification time.
    pub fn with_mtime(mut self, mtime_unix: i64) -> Self {
        self.mtime_unix = Some(mtime_unix);
        self
    }

    /// Set the inode number.
    pub fn with_inode(mut self, inode: u64) -> Self {
        self.inode = Some(inode);
        self
    }

    /// Set the immediate file count.
    pub fn with_file_count(mut self, file_count: u64) -> Self {
        self.file_count = Some(file_count);
        self
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// Depth below the scan root.
    pub fn depth(&self) -> u32 {
        path::depth(&self.path)
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<&str> {
        path::parent(&self.path)
    }
}

/// Aggregate statistics for one directory's subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollup {
    /// Files anywhere beneath this directory.
    pub total_files: u64,

    /// Directories anywhere beneath this directory.
    #[serde(default)]
    pub total_descendant_dirs: u64,

    /// File count per extension. Files without an extension are counted
    /// under the empty string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<CompactString, u64>>,

    /// Size distribution of the subtree's files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeStats>,

    /// Newest modification time in the subtree (unix seconds, 0 if unknown).
    #[serde(default)]
    pub last_modified: i64,

    /// Shape of the subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthStats>,
}

impl Rollup {
    /// Sum of all extension counts, if extensions were aggregated.
    pub fn extension_total(&self) -> Option<u64> {
        self.extensions.as_ref().map(|exts| exts.values().sum())
    }
}

/// Size statistics in bytes.
///
/// `min`, `max`, `mean` and `median` are computed over files with a
/// positive size only; `sampled` counts those files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStats {
    pub total: u64,
    #[serde(default)]
    pub sampled: u64,
    #[serde(default)]
    pub min: u64,
    #[serde(default)]
    pub max: u64,
    #[serde(default)]
    pub mean: u64,
    #[serde(default)]
    pub median: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<Percentiles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<SizeBuckets>,
}

/// Nearest-rank percentile estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

/// Four-way file size histogram with half-open ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBuckets {
    /// `[0, 1 KiB)`
    pub lt_1kb: u64,
    /// `[1 KiB, 1 MiB)`
    pub kb_to_1mb: u64,
    /// `[1 MiB, 10 MiB)`
    pub mb_to_10mb: u64,
    /// `[10 MiB, ∞)`
    pub gt_10mb: u64,
}

impl SizeBuckets {
    pub const KIB: u64 = 1024;
    pub const MIB: u64 = 1024 * 1024;
    pub const TEN_MIB: u64 = 10 * 1024 * 1024;

    /// Count one file of the given size.
    pub fn record(&mut self, size: u64) {
        match size {
            s if s < Self::KIB => self.lt_1kb += 1,
            s if s < Self::MIB => self.kb_to_1mb += 1,
            s if s < Self::TEN_MIB => self.mb_to_10mb += 1,
            _ => self.gt_10mb += 1,
        }
    }

    /// Add another histogram into this one.
    pub fn merge(&mut self, other: &SizeBuckets) {
        self.lt_1kb += other.lt_1kb;
        self.kb_to_1mb += other.kb_to_1mb;
        self.mb_to_10mb += other.mb_to_10mb;
        self.gt_10mb += other.gt_10mb;
    }

    /// Number of files across all buckets.
    pub fn total(&self) -> u64 {
        self.lt_1kb + self.kb_to_1mb + self.mb_to_10mb + self.gt_10mb
    }
}

/// Depth metrics for a directory's subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthStats {
    /// Depth of the deepest entry relative to this directory (0 if empty).
    pub max_depth: u32,
    /// Directories in the subtree, this one included, without subdirectories.
    pub leaf_dirs: u64,
}
