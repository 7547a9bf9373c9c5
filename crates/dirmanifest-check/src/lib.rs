//! Capability validation for dirmanifest.
//!
//! A manifest declares which rollup guarantees it provides (its
//! capabilities). This crate proves those guarantees hold:
//!
//! - **Registry** - an immutable table of named, severity-tagged
//!   invariants per capability
//! - **Validator** - runs the invariants of every declared capability over
//!   every rolled-up directory and collects all violations
//! - **Summary** - counts by severity, capability and invariant
//! - **Reporting** - renders violations as `tracing` events
//!
//! ```rust
//! use dirmanifest_check::{CapabilityRegistry, Validator};
//! use dirmanifest_core::{Node, RollupCapabilities, RollupOptions};
//! use dirmanifest_rollup::RollupAggregator;
//!
//! let mut nodes = vec![Node::new_directory("."), Node::new_file("a.txt", 10)];
//! let aggregator = RollupAggregator::new(RollupOptions::default());
//! aggregator.aggregate(&mut nodes).unwrap();
//!
//! let registry = CapabilityRegistry::standard();
//! let report = Validator::new(&registry).validate(&aggregator.capabilities(), &nodes);
//! assert!(!report.is_fatal());
//! ```

mod error;
mod invariant;
mod registry;
pub mod report;
mod severity;
mod summary;
mod validator;
mod violation;

pub use error::ValidationFailed;
pub use invariant::{CheckFn, Invariant};
pub use registry::{CapabilityRegistry, HAS_INVARIANTS, STRUCTURAL};
pub use severity::Severity;
pub use summary::ViolationSummary;
pub use validator::{ValidationReport, Validator};
pub use violation::InvariantViolation;
