//! Error and skip-record types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Errors that can occur while scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An ignore pattern failed to compile.
    #[error("Invalid ignore pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// An entry was recorded beneath a directory that was skipped.
    #[error("{path:?} appears under skipped directory {skipped_dir:?}")]
    SkippedLeak { path: String, skipped_dir: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors raised by rollup aggregation on structurally invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollupError {
    /// Two nodes share the same path.
    #[error("Duplicate node path: {path}")]
    DuplicatePath { path: String },

    /// Aggregation options contradict each other.
    #[error("Invalid rollup options: {message}")]
    InvalidOptions { message: String },
}

/// Why the traversal left an entry out of the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Matched an ignore pattern.
    Ignored,
    /// Hidden entry while hidden entries are excluded.
    Hidden,
    /// Permission was denied.
    PermissionDenied,
    /// Error reading the entry or directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// An entry the traversal skipped, passed through to the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    /// Path relative to the scan root.
    pub path: String,
    /// Whether the skipped entry is a directory.
    #[serde(default)]
    pub is_dir: bool,
    /// Why it was skipped.
    pub reason: SkipReason,
    /// Pattern that pruned the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl SkipRecord {
    /// Create a new skip record.
    pub fn new(path: impl Into<String>, is_dir: bool, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            is_dir,
            reason,
            rule: None,
            message: String::new(),
        }
    }

    /// Attach the pattern that pruned the entry.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Attach a detail message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Create an ignored-entry record.
    pub fn ignored(path: impl Into<String>, is_dir: bool) -> Self {
        Self::new(path, is_dir, SkipReason::Ignored)
    }

    /// Create a read error record.
    pub fn read_error(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(path, false, SkipReason::ReadError).with_message(format!("Read error: {error}"))
    }
}
