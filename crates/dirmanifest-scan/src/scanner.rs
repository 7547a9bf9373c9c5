//! JWalk-based parallel directory scanner.

use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use chrono::{DateTime, Utc};
use jwalk::{Parallelism, WalkDir};

use dirmanifest_core::{Manifest, Node, ScanConfig, ScanError, SkipReason, SkipRecord, path};

use crate::ignore::IgnoreMatcher;

/// Result of one traversal: the node list plus everything left out.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Canonical scan root.
    pub root: PathBuf,
    /// Every recorded entry, sorted by path. The root is `"."`.
    pub nodes: Vec<Node>,
    /// Skipped entries, sorted by path.
    pub skipped: Vec<SkipRecord>,
}

impl ScanOutput {
    /// Wrap the output in a manifest with no rollups yet.
    pub fn into_manifest(self) -> Manifest {
        Manifest::new(self.root, self.nodes, self.skipped)
    }
}

/// Scanner using jwalk for parallel traversal.
#[derive(Debug, Clone, Default)]
pub struct ManifestScanner;

impl ManifestScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Walk `config.root` and collect its nodes.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanOutput, ScanError> {
        let start = Instant::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let matcher = Arc::new(IgnoreMatcher::new(
            config.ignore_patterns.as_slice(),
            config.allow_patterns.as_slice(),
        )?);
        let pruned: Arc<Mutex<Vec<SkipRecord>>> = Arc::default();

        tracing::info!(
            root = %root_path.display(),
            patterns = matcher.len(),
            threads = config.threads,
            "scan started"
        );

        let walker = self.walker(config, &root_path, Arc::clone(&matcher), Arc::clone(&pruned));

        let mut nodes = Vec::new();
        let mut skipped = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let rel = err
                        .path()
                        .map(|p| relative_path(&root_path, p))
                        .unwrap_or_else(|| path::ROOT.to_string());
                    let denied = err
                        .io_error()
                        .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied);
                    tracing::warn!(path = %rel, error = %err, "walk error");

                    skipped.push(if denied {
                        SkipRecord::new(rel, false, SkipReason::PermissionDenied)
                            .with_message(err.to_string())
                    } else {
                        SkipRecord::read_error(rel, &err)
                    });
                    continue;
                }
            };

            let full_path = entry.path();
            let rel = relative_path(&root_path, &full_path);
            let is_dir = entry.file_type().is_dir();

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(path = %rel, error = %err, "metadata error");
                    skipped.push(
                        SkipRecord::new(rel, is_dir, SkipReason::MetadataError)
                            .with_message(err.to_string()),
                    );
                    continue;
                }
            };

            let mut node = if is_dir {
                Node::new_directory(rel)
            } else {
                Node::new_file(rel, metadata.len())
            };
            if config.collect_timestamps {
                node.mtime_unix = mtime_unix(&metadata);
            }
            if config.collect_inodes {
                node.inode = get_ino(&metadata);
            }
            nodes.push(node);
        }

        // Pruned entries were recorded from jwalk's worker threads
        skipped.append(&mut pruned.lock().unwrap_or_else(PoisonError::into_inner));

        if config.collect_file_counts {
            assign_file_counts(&mut nodes);
        }

        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        skipped.sort_by(|a, b| a.path.cmp(&b.path));
        skipped.dedup_by(|a, b| a.path == b.path);

        tracing::info!(
            nodes = nodes.len(),
            skipped = skipped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan finished"
        );

        Ok(ScanOutput {
            root: root_path,
            nodes,
            skipped,
        })
    }

    /// Configure jwalk. Ignored and hidden children are removed before
    /// their directory's contents are read, so pruned subtrees are never
    /// descended into.
    fn walker(
        &self,
        config: &ScanConfig,
        root_path: &Path,
        matcher: Arc<IgnoreMatcher>,
        pruned: Arc<Mutex<Vec<SkipRecord>>>,
    ) -> WalkDir {
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let include_hidden = config.include_hidden;
        let root = root_path.to_path_buf();

        WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |depth, _dir, _state, children| {
                // The root is listed on its own with no depth; it is never filtered
                if depth.is_none() {
                    return;
                }

                let mut records = Vec::new();

                children.retain(|child| {
                    let Ok(entry) = child else {
                        return true;
                    };
                    let name = entry.file_name().to_string_lossy();
                    let rel = relative_path(&root, &entry.path());
                    let is_dir = entry.file_type().is_dir();

                    if !include_hidden && name.starts_with('.') {
                        records.push(SkipRecord::new(rel, is_dir, SkipReason::Hidden));
                        return false;
                    }
                    match matcher.matched_rule(&name, &rel) {
                        Some(rule) => {
                            records.push(SkipRecord::ignored(rel, is_dir).with_rule(rule));
                            false
                        }
                        None => true,
                    }
                });

                if !records.is_empty() {
                    pruned
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .append(&mut records);
                }
            })
    }
}

/// Set each directory's immediate file count from the recorded files.
fn assign_file_counts(nodes: &mut [Node]) {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for node in nodes.iter().filter(|n| n.is_file()) {
        if let Some(parent) = node.parent() {
            *counts.entry(parent.to_string()).or_insert(0) += 1;
        }
    }

    for node in nodes.iter_mut().filter(|n| n.is_dir) {
        node.file_count = Some(counts.get(&node.path).copied().unwrap_or(0));
    }
}

/// Path of `full` relative to `root`, `/`-separated, `"."` for the root.
fn relative_path(root: &Path, full: &Path) -> String {
    let Ok(rel) = full.strip_prefix(root) else {
        return full.to_string_lossy().into_owned();
    };

    let segments: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        path::ROOT.to_string()
    } else {
        segments.join("/")
    }
}

/// Modification time in whole seconds since the Unix epoch.
fn mtime_unix(metadata: &Metadata) -> Option<i64> {
    metadata
        .modified()
        .ok()
        .map(|t| DateTime::<Utc>::from(t).timestamp())
}

// Cross-platform metadata helpers

#[cfg(unix)]
fn get_ino(metadata: &Metadata) -> Option<u64> {
    Some(metadata.ino())
}

#[cfg(not(unix))]
fn get_ino(_metadata: &Metadata) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_path() {
        let root = Path::new("/data/root");
        assert_eq!(relative_path(root, Path::new("/data/root")), ".");
        assert_eq!(relative_path(root, Path::new("/data/root/a")), "a");
        assert_eq!(relative_path(root, Path::new("/data/root/a/b.txt")), "a/b.txt");
    }

    #[test]
    fn test_file_counts_are_immediate() {
        let mut nodes = vec![
            Node::new_directory("."),
            Node::new_directory("a"),
            Node::new_file("x", 1),
            Node::new_file("a/y", 1),
            Node::new_file("a/z", 1),
        ];
        assign_file_counts(&mut nodes);

        assert_eq!(nodes[0].file_count, Some(1));
        assert_eq!(nodes[1].file_count, Some(2));
        assert_eq!(nodes[2].file_count, None);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let err = ManifestScanner::new()
            .scan(&ScanConfig::new(&file))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ManifestScanner::new()
            .scan(&ScanConfig::new(temp.path().join("missing")))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }
}
