//! Post-scan check that skipped directories stay skipped.

use dirmanifest_core::{Node, ScanError, SkipRecord, path};

/// Fail if any node, or any other skip record, lies beneath a skipped
/// directory.
pub fn verify_skip_isolation(nodes: &[Node], skipped: &[SkipRecord]) -> Result<(), ScanError> {
    let skipped_dirs: Vec<&str> = skipped
        .iter()
        .filter(|s| s.is_dir)
        .map(|s| s.path.as_str())
        .collect();

    if skipped_dirs.is_empty() {
        return Ok(());
    }

    let paths = nodes
        .iter()
        .map(|n| n.path.as_str())
        .chain(skipped.iter().map(|s| s.path.as_str()));

    for entry in paths {
        if let Some(dir) = skipped_dirs.iter().find(|dir| path::is_beneath(entry, dir)) {
            return Err(ScanError::SkippedLeak {
                path: entry.to_string(),
                skipped_dir: dir.to_string(),
            });
        }
    }

    Ok(())
}
