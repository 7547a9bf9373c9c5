//! Core types for dirmanifest.
//!
//! This crate provides the fundamental data structures shared by the
//! dirmanifest crates: filesystem nodes and their rollups, the manifest
//! container with its capability declaration, configuration, and the
//! POSIX path helpers used to rebuild a tree from flat paths.

mod config;
mod error;
mod manifest;
mod node;
pub mod path;

pub use config::{RollupOptions, RollupOptionsBuilder, ScanConfig, ScanConfigBuilder};
pub use error::{RollupError, ScanError, SkipReason, SkipRecord};
pub use manifest::{
    Capabilities, GeneratorMeta, MANIFEST_VERSION, Manifest, ManifestMeta, RollupCapabilities,
    SchemaMeta,
};
pub use node::{DepthStats, Node, Percentiles, Rollup, SizeBuckets, SizeStats};
