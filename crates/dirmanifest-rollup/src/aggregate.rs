//! Bottom-up rollup aggregation.
//!
//! Directories are processed one depth level at a time, deepest first.
//! Directories on the same level have disjoint subtrees, so a level is
//! aggregated in parallel; every directory only reads rollups of its direct
//! children, which were finalized by the previous level.
//!
//! Totals, the extension histogram, size samples, buckets and
//! `last_modified` are subtree-wide: each directory folds in its
//! subdirectories' finished rollups and size samples.

use std::collections::BTreeMap;

use compact_str::CompactString;
use rayon::prelude::*;

use dirmanifest_core::{
    DepthStats, Manifest, Node, Rollup, RollupCapabilities, RollupError, RollupOptions,
    SizeBuckets, SizeStats, path,
};

use crate::index::TreeIndex;
use crate::stats;

/// Computes one [`Rollup`] per directory of a flat node list.
#[derive(Debug, Clone, Default)]
pub struct RollupAggregator {
    options: RollupOptions,
}

impl RollupAggregator {
    /// Create an aggregator with the given metric families.
    pub fn new(options: RollupOptions) -> Self {
        Self { options }
    }

    /// Metric families this aggregator computes.
    pub fn options(&self) -> &RollupOptions {
        &self.options
    }

    /// Capabilities a manifest aggregated with these options may declare.
    pub fn capabilities(&self) -> RollupCapabilities {
        RollupCapabilities::from_options(&self.options)
    }

    /// Aggregate a manifest in place and declare the resulting
    /// capabilities. An empty manifest is left untouched.
    pub fn apply(&self, manifest: &mut Manifest) -> Result<usize, RollupError> {
        if manifest.nodes.is_empty() {
            return Ok(0);
        }
        let rolled = self.aggregate(&mut manifest.nodes)?;

        let mut capabilities = self.capabilities();
        if capabilities.activity_span && !activity_span_known(&manifest.nodes) {
            tracing::debug!("modification times missing, activity span not declared");
            capabilities.activity_span = false;
        }
        manifest.meta.capabilities.rollup = capabilities;
        Ok(rolled)
    }

    /// Attach a rollup to every directory node. Returns the number of
    /// directories rolled up.
    pub fn aggregate(&self, nodes: &mut [Node]) -> Result<usize, RollupError> {
        if nodes.is_empty() {
            return Ok(0);
        }
        self.options.ensure_consistent()?;

        let index = TreeIndex::build(nodes)?;
        index.assign_direct_subdir_counts(nodes);

        let levels = index.levels(nodes);
        // Sorted subtree size samples, handed from each directory to its parent
        let mut samples: Vec<Vec<u64>> = vec![Vec::new(); nodes.len()];
        let mut rolled = 0;

        for level in &levels {
            let inputs: Vec<(usize, Vec<u64>)> = level
                .iter()
                .map(|&dir| {
                    let mut inherited = Vec::new();
                    if self.options.size_bytes {
                        for &child in index.children(dir) {
                            if nodes[child].is_dir {
                                inherited.append(&mut samples[child]);
                            }
                        }
                    }
                    (dir, inherited)
                })
                .collect();

            let snapshot: &[Node] = nodes;
            let finished: Vec<(usize, Rollup, Vec<u64>)> = inputs
                .into_par_iter()
                .map(|(dir, inherited)| {
                    let (rollup, dir_samples) = self.roll_up(snapshot, &index, dir, inherited);
                    (dir, rollup, dir_samples)
                })
                .collect();

            for (dir, rollup, dir_samples) in finished {
                nodes[dir].rollup = Some(rollup);
                samples[dir] = dir_samples;
                rolled += 1;
            }
        }

        tracing::debug!(directories = rolled, levels = levels.len(), "rollups built");
        Ok(rolled)
    }

    /// Aggregate one directory from its direct children.
    fn roll_up(
        &self,
        nodes: &[Node],
        index: &TreeIndex,
        dir: usize,
        mut samples: Vec<u64>,
    ) -> (Rollup, Vec<u64>) {
        let opts = &self.options;
        let mut rollup = Rollup::default();
        let mut extensions: BTreeMap<CompactString, u64> = BTreeMap::new();
        let mut buckets = SizeBuckets::default();
        let mut last_modified: Option<i64> = None;
        let mut max_depth: u32 = 0;
        let mut leaf_dirs: u64 = 0;
        let mut has_subdirs = false;

        for &child_idx in index.children(dir) {
            let child = &nodes[child_idx];
            last_modified = newest(last_modified, child.mtime_unix);
            max_depth = max_depth.max(1);

            if child.is_dir {
                has_subdirs = true;
                let Some(child_rollup) = child.rollup.as_ref() else {
                    continue;
                };

                if opts.dir_counts {
                    rollup.total_descendant_dirs += 1 + child_rollup.total_descendant_dirs;
                }
                rollup.total_files += child_rollup.total_files;
                let known = child_rollup.last_modified != 0;
                last_modified = newest(last_modified, known.then_some(child_rollup.last_modified));

                if let Some(child_exts) = &child_rollup.extensions {
                    for (ext, count) in child_exts {
                        *extensions.entry(ext.clone()).or_insert(0) += count;
                    }
                }
                if let Some(child_buckets) = child_rollup.size.as_ref().and_then(|s| s.buckets.as_ref()) {
                    buckets.merge(child_buckets);
                }
                if let Some(child_depth) = child_rollup.depth {
                    max_depth = max_depth.max(child_depth.max_depth + 1);
                    leaf_dirs += child_depth.leaf_dirs;
                }
            } else {
                rollup.total_files += 1;

                if opts.file_types {
                    let ext = path::extension(child.name());
                    *extensions.entry(CompactString::new(ext)).or_insert(0) += 1;
                }

                let size = child.size_bytes.unwrap_or(0);
                if opts.size_buckets {
                    buckets.record(size);
                }
                if opts.size_bytes && size > 0 {
                    samples.push(size);
                }
            }
        }

        rollup.last_modified = last_modified.unwrap_or(0);

        if opts.file_types {
            rollup.extensions = Some(extensions);
        }

        if opts.size_bytes {
            samples.sort_unstable();
            let buckets = opts.size_buckets.then_some(buckets);
            rollup.size = Some(self.size_stats(&samples, buckets));
        }

        if opts.depth_stats {
            rollup.depth = Some(DepthStats {
                max_depth,
                leaf_dirs: if has_subdirs { leaf_dirs } else { 1 },
            });
        }

        (rollup, samples)
    }

    /// Finalize size statistics over an ascending-sorted sample.
    fn size_stats(&self, sorted: &[u64], buckets: Option<SizeBuckets>) -> SizeStats {
        let mut size = SizeStats {
            buckets,
            ..SizeStats::default()
        };

        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return size;
        };

        let sampled = sorted.len() as u64;
        size.total = sorted.iter().sum();
        size.sampled = sampled;
        size.min = min;
        size.max = max;
        size.mean = size.total / sampled;

        if self.options.percentiles {
            // Pinning the median to p50 keeps median == p50 by construction
            size.percentiles = stats::percentiles(sorted);
            size.median = size.percentiles.map(|p| p.p50).unwrap_or_default();
        } else {
            size.median = stats::median(sorted);
        }

        size
    }
}

/// Later of two optional timestamps.
fn newest(current: Option<i64>, candidate: Option<i64>) -> Option<i64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Whether every directory holding files ended up with a known
/// `last_modified` (`0` means unknown).
fn activity_span_known(nodes: &[Node]) -> bool {
    nodes
        .iter()
        .filter_map(|n| n.rollup.as_ref())
        .all(|r| r.total_files == 0 || r.last_modified != 0)
}
