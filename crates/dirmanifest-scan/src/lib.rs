//! File system traversal for dirmanifest.
//!
//! Walks a directory in parallel with jwalk and produces the flat node list
//! a manifest is built from:
//!
//! - **Parallel traversal** via jwalk/rayon
//! - **Ignore patterns** compiled with globset; matching directories are
//!   pruned, never descended into
//! - **Skip records** for every ignored, hidden or unreadable entry
//! - **Skip isolation** check proving nothing leaked out of a pruned
//!   directory
//!
//! # Example
//!
//! ```rust,no_run
//! use dirmanifest_scan::{ManifestScanner, ScanConfig, verify_skip_isolation};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let output = ManifestScanner::new().scan(&config).unwrap();
//! verify_skip_isolation(&output.nodes, &output.skipped).unwrap();
//!
//! println!("{} nodes, {} skipped", output.nodes.len(), output.skipped.len());
//! ```

mod ignore;
mod isolation;
mod scanner;

pub use ignore::IgnoreMatcher;
pub use isolation::verify_skip_isolation;
pub use scanner::{ManifestScanner, ScanOutput};

// Re-export core types for convenience
pub use dirmanifest_core::{Manifest, Node, ScanConfig, ScanError, SkipReason, SkipRecord};
