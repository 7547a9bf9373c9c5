//! Block and allow pattern matching.

use globset::{Glob, GlobSet, GlobSetBuilder};

use dirmanifest_core::ScanError;

/// Compiled ignore (block) and allow patterns.
///
/// A pattern matches either an entry's name or its path relative to the
/// scan root, so `target` and `crates/*/target` both work. An entry is
/// pruned when a block pattern matches and no allow pattern does.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    block: GlobSet,
    block_patterns: Vec<String>,
    allow: GlobSet,
}

impl IgnoreMatcher {
    /// Compile block and allow glob patterns.
    pub fn new<S: AsRef<str>>(block: &[S], allow: &[S]) -> Result<Self, ScanError> {
        Ok(Self {
            block: compile(block)?,
            block_patterns: block.iter().map(|p| p.as_ref().to_string()).collect(),
            allow: compile(allow)?,
        })
    }

    /// The first block pattern (in configuration order) that prunes this
    /// entry, or `None` if it is kept.
    pub fn matched_rule(&self, name: &str, relative: &str) -> Option<&str> {
        if self.block_patterns.is_empty() {
            return None;
        }

        let first = self
            .block
            .matches(name)
            .into_iter()
            .chain(self.block.matches(relative))
            .min()?;

        if self.allow.is_match(name) || self.allow.is_match(relative) {
            return None;
        }
        self.block_patterns.get(first).map(String::as_str)
    }

    /// Number of block patterns.
    pub fn len(&self) -> usize {
        self.block_patterns.len()
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| ScanError::InvalidConfig {
        message: e.to_string(),
    })
}
