//! Rollup aggregation for dirmanifest.
//!
//! This crate turns a flat, path-keyed node list into a tree and attaches
//! subtree statistics to every directory:
//!
//! - **Totals** - files and descendant directories
//! - **Sizes** - total, min, max, mean, median, nearest-rank percentiles
//!   and a four-way size histogram
//! - **Content** - extension histogram
//! - **Recency** - newest modification time in the subtree
//! - **Shape** - deepest descendant and leaf directory count
//!
//! ```rust
//! use dirmanifest_core::{Node, RollupOptions};
//! use dirmanifest_rollup::RollupAggregator;
//!
//! let mut nodes = vec![
//!     Node::new_directory("a"),
//!     Node::new_file("a/x.txt", 500),
//!     Node::new_file("a/y.txt", 1500),
//! ];
//!
//! RollupAggregator::new(RollupOptions::default())
//!     .aggregate(&mut nodes)
//!     .unwrap();
//!
//! let rollup = nodes[0].rollup.as_ref().unwrap();
//! assert_eq!(rollup.total_files, 2);
//! assert_eq!(rollup.size.as_ref().unwrap().total, 2000);
//! ```

mod aggregate;
mod index;
pub mod stats;

pub use aggregate::RollupAggregator;
pub use index::TreeIndex;

// Re-export core types
pub use dirmanifest_core::{Node, Rollup, RollupCapabilities, RollupError, RollupOptions};
