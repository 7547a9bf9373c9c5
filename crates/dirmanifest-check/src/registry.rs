//! Capability → invariant table.

use std::collections::BTreeMap;

use dirmanifest_core::RollupCapabilities as Caps;

use crate::invariant::Invariant;

/// Capability name under which structural invariants are reported.
pub const STRUCTURAL: &str = "rollup";

/// Invariant name reported for a declared capability with no checks.
pub const HAS_INVARIANTS: &str = "capability.has_invariants";

/// Immutable lookup table from capability name to its ordered invariants.
///
/// Structural invariants are not tied to a capability and run for every
/// rolled-up directory.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    structural: Vec<Invariant>,
    capabilities: BTreeMap<String, Vec<Invariant>>,
}

impl CapabilityRegistry {
    /// A registry with no invariants at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table covering every rollup capability.
    pub fn standard() -> Self {
        Self::empty()
            .with_structural(vec![checks::TOTAL_FILES])
            .with_capability(
                Caps::SIZE_STATS,
                vec![
                    checks::SIZE_PRESENT,
                    checks::SIZE_TOTAL,
                    checks::SIZE_ORDER,
                    checks::SIZE_MEAN,
                    checks::SIZE_SAMPLED,
                ],
            )
            .with_capability(
                Caps::SIZE_PERCENTILES,
                vec![
                    checks::PERCENTILES_PRESENT,
                    checks::PERCENTILES_ORDER,
                    checks::PERCENTILES_MEDIAN,
                ],
            )
            .with_capability(
                Caps::SIZE_BUCKETS,
                vec![checks::BUCKETS_PRESENT, checks::BUCKETS_SUM],
            )
            .with_capability(
                Caps::ACTIVITY_SPAN,
                vec![checks::LAST_MODIFIED, checks::COVERS_SELF],
            )
            .with_capability(Caps::DIR_COUNTS, vec![checks::DESCENDANT_DIRS])
            .with_capability(
                Caps::DEPTH_STATS,
                vec![checks::DEPTH_PRESENT, checks::MAX_DEPTH],
            )
            .with_capability(Caps::DEPTH_METRICS, vec![checks::LEAF_DIRS])
            .with_capability(
                Caps::EXTENSION_COUNTS,
                vec![checks::EXTENSIONS_PRESENT, checks::EXTENSIONS_PRESENT_WHEN_EMPTY],
            )
            .with_capability(Caps::FILE_TYPES, vec![checks::EXTENSIONS_SUM])
    }

    /// Register (or replace) the invariants of a capability.
    pub fn with_capability(mut self, name: impl Into<String>, invariants: Vec<Invariant>) -> Self {
        self.capabilities.insert(name.into(), invariants);
        self
    }

    /// Replace the structural invariants.
    pub fn with_structural(mut self, invariants: Vec<Invariant>) -> Self {
        self.structural = invariants;
        self
    }

    /// Invariants of a capability, `None` if the name is unknown.
    pub fn invariants(&self, capability: &str) -> Option<&[Invariant]> {
        self.capabilities.get(capability).map(Vec::as_slice)
    }

    /// Invariants checked regardless of declared capabilities.
    pub fn structural(&self) -> &[Invariant] {
        &self.structural
    }

    /// Registered capability names, in name order.
    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }
}

mod checks {
    use dirmanifest_core::{Node, Rollup};

    use crate::invariant::Invariant;

    // Structural

    pub const TOTAL_FILES: Invariant = Invariant::error(
        "rollup.total_files",
        "total_files is at least the directory's immediate file_count",
        |node, rollup| match node.file_count {
            Some(file_count) if rollup.total_files < file_count => Err(format!(
                "total_files {} < file_count {file_count}",
                rollup.total_files
            )),
            _ => Ok(()),
        },
    );

    // size_stats

    pub const SIZE_PRESENT: Invariant = Invariant::error(
        "size.present",
        "size statistics are present",
        |_, rollup| match rollup.size {
            Some(_) => Ok(()),
            None => Err("size block missing".to_string()),
        },
    );

    pub const SIZE_TOTAL: Invariant = Invariant::error(
        "size.total",
        "size.total covers every sampled file",
        |_, rollup| {
            let Some(size) = &rollup.size else {
                return Ok(());
            };
            if size.sampled > 0 && size.total == 0 {
                return Err("size.total missing".to_string());
            }
            if size.total < size.max {
                return Err(format!("size.total {} < size.max {}", size.total, size.max));
            }
            Ok(())
        },
    );

    pub const SIZE_ORDER: Invariant = Invariant::error(
        "size.order",
        "min <= median <= max",
        |_, rollup| match &rollup.size {
            Some(s) if s.sampled > 0 && !(s.min <= s.median && s.median <= s.max) => Err(format!(
                "min {} / median {} / max {} out of order",
                s.min, s.median, s.max
            )),
            _ => Ok(()),
        },
    );

    pub const SIZE_MEAN: Invariant = Invariant::error(
        "size.mean",
        "min <= mean <= max",
        |_, rollup| match &rollup.size {
            Some(s) if s.sampled > 0 && !(s.min <= s.mean && s.mean <= s.max) => Err(format!(
                "mean {} outside [{}, {}]",
                s.mean, s.min, s.max
            )),
            _ => Ok(()),
        },
    );

    pub const SIZE_SAMPLED: Invariant = Invariant::error(
        "size.sampled",
        "sampled files never exceed total_files",
        |_, rollup| match &rollup.size {
            Some(s) if s.sampled > rollup.total_files => Err(format!(
                "sampled {} > total_files {}",
                s.sampled, rollup.total_files
            )),
            _ => Ok(()),
        },
    );

    // size_percentiles

    pub const PERCENTILES_PRESENT: Invariant = Invariant::error(
        "size.percentiles.present",
        "percentiles are present whenever sizes were sampled",
        |_, rollup| match &rollup.size {
            None => Err("size block missing".to_string()),
            Some(s) if s.sampled > 0 && s.percentiles.is_none() => {
                Err("percentiles missing".to_string())
            }
            Some(_) => Ok(()),
        },
    );

    pub const PERCENTILES_ORDER: Invariant = Invariant::error(
        "size.percentiles.order",
        "min <= p50 <= p90 <= p99 <= max",
        |_, rollup| {
            let Some(size) = &rollup.size else {
                return Ok(());
            };
            let Some(p) = size.percentiles else {
                return Ok(());
            };
            if size.min <= p.p50 && p.p50 <= p.p90 && p.p90 <= p.p99 && p.p99 <= size.max {
                Ok(())
            } else {
                Err(format!(
                    "min {} p50 {} p90 {} p99 {} max {} out of order",
                    size.min, p.p50, p.p90, p.p99, size.max
                ))
            }
        },
    );

    pub const PERCENTILES_MEDIAN: Invariant = Invariant::error(
        "size.percentiles.median",
        "median equals p50",
        |_, rollup| match &rollup.size {
            Some(s) => match s.percentiles {
                Some(p) if p.p50 != s.median => {
                    Err(format!("median {} != p50 {}", s.median, p.p50))
                }
                _ => Ok(()),
            },
            None => Ok(()),
        },
    );

    // size_buckets

    pub const BUCKETS_PRESENT: Invariant = Invariant::error(
        "size_buckets.present",
        "size buckets are present",
        |_, rollup| match rollup.size.as_ref().and_then(|s| s.buckets) {
            Some(_) => Ok(()),
            None => Err("buckets missing".to_string()),
        },
    );

    pub const BUCKETS_SUM: Invariant = Invariant::error(
        "size_buckets.sum",
        "bucket counts sum to total_files",
        |_, rollup| match rollup.size.as_ref().and_then(|s| s.buckets) {
            Some(b) if b.total() != rollup.total_files => Err(format!(
                "buckets sum to {}, total_files is {}",
                b.total(),
                rollup.total_files
            )),
            _ => Ok(()),
        },
    );

    // activity_span

    pub const LAST_MODIFIED: Invariant = Invariant::error(
        "activity_span.last_modified",
        "last_modified is set for directories containing files",
        |_, rollup| {
            if rollup.total_files > 0 && rollup.last_modified == 0 {
                Err("last_modified missing".to_string())
            } else {
                Ok(())
            }
        },
    );

    pub const COVERS_SELF: Invariant = Invariant::warning(
        "activity_span.covers_self",
        "last_modified is not older than the directory's own mtime",
        |node: &Node, rollup: &Rollup| match node.mtime_unix {
            Some(mtime) if rollup.last_modified > 0 && rollup.last_modified < mtime => Err(format!(
                "last_modified {} < directory mtime {mtime}",
                rollup.last_modified
            )),
            _ => Ok(()),
        },
    );

    // dir_counts

    pub const DESCENDANT_DIRS: Invariant = Invariant::error(
        "dir_counts.total_descendant_dirs",
        "total_descendant_dirs is at least direct_subdir_count",
        |node, rollup| match node.direct_subdir_count {
            Some(direct) if rollup.total_descendant_dirs < direct => Err(format!(
                "total_descendant_dirs {} < direct_subdir_count {direct}",
                rollup.total_descendant_dirs
            )),
            _ => Ok(()),
        },
    );

    // depth_stats / depth_metrics

    pub const DEPTH_PRESENT: Invariant = Invariant::error(
        "depth.present",
        "depth statistics are present",
        |_, rollup| match rollup.depth {
            Some(_) => Ok(()),
            None => Err("depth block missing".to_string()),
        },
    );

    pub const MAX_DEPTH: Invariant = Invariant::error(
        "depth.max_depth",
        "non-empty directories reach depth of at least 1",
        |node, rollup| {
            let Some(depth) = rollup.depth else {
                return Ok(());
            };
            let has_entries =
                rollup.total_files > 0 || node.direct_subdir_count.unwrap_or(0) > 0;
            if has_entries && depth.max_depth == 0 {
                Err("max_depth is 0 for a non-empty directory".to_string())
            } else {
                Ok(())
            }
        },
    );

    pub const LEAF_DIRS: Invariant = Invariant::error(
        "depth.leaf_dirs",
        "every subtree has at least one leaf directory; a directory without subdirectories is exactly one",
        |node, rollup| {
            let Some(depth) = rollup.depth else {
                return Ok(());
            };
            if depth.leaf_dirs == 0 {
                return Err("leaf_dirs is 0".to_string());
            }
            if node.direct_subdir_count == Some(0) && depth.leaf_dirs != 1 {
                return Err(format!(
                    "leaf_dirs {} for a directory without subdirectories",
                    depth.leaf_dirs
                ));
            }
            Ok(())
        },
    );

    // extension_counts / file_types

    pub const EXTENSIONS_PRESENT: Invariant = Invariant::error(
        "extensions.present",
        "extension counts are present for directories containing files",
        |_, rollup| {
            if rollup.extensions.is_none() && rollup.total_files > 0 {
                Err("extensions missing".to_string())
            } else {
                Ok(())
            }
        },
    );

    pub const EXTENSIONS_PRESENT_WHEN_EMPTY: Invariant = Invariant::warning(
        "extensions.present_when_empty",
        "extension counts are present for empty directories",
        |_, rollup| {
            if rollup.extensions.is_none() && rollup.total_files == 0 {
                Err("extensions missing for empty directory".to_string())
            } else {
                Ok(())
            }
        },
    );

    pub const EXTENSIONS_SUM: Invariant = Invariant::error(
        "extensions.sum",
        "extension counts sum to total_files",
        |_, rollup| match rollup.extension_total() {
            Some(sum) if sum != rollup.total_files => Err(format!(
                "extensions sum to {sum}, total_files is {}",
                rollup.total_files
            )),
            None if rollup.total_files > 0 => Err("extensions missing".to_string()),
            _ => Ok(()),
        },
    );
}
