//! Named, severity-tagged rollup checks.

use dirmanifest_core::{Node, Rollup};

use crate::severity::Severity;

/// A check over one directory and its rollup. `Err` carries the cause.
pub type CheckFn = fn(&Node, &Rollup) -> Result<(), String>;

/// One consistency check belonging to a capability.
#[derive(Debug, Clone, Copy)]
pub struct Invariant {
    /// Dotted identifier, e.g. `size_buckets.sum`.
    pub name: &'static str,
    /// What the invariant guarantees.
    pub description: &'static str,
    pub severity: Severity,
    check: CheckFn,
}

impl Invariant {
    /// Create an invariant.
    pub const fn new(
        name: &'static str,
        description: &'static str,
        severity: Severity,
        check: CheckFn,
    ) -> Self {
        Self {
            name,
            description,
            severity,
            check,
        }
    }

    /// Create a fatal invariant.
    pub const fn error(name: &'static str, description: &'static str, check: CheckFn) -> Self {
        Self::new(name, description, Severity::Error, check)
    }

    /// Create a non-fatal invariant.
    pub const fn warning(name: &'static str, description: &'static str, check: CheckFn) -> Self {
        Self::new(name, description, Severity::Warning, check)
    }

    /// Run the check.
    pub fn check(&self, node: &Node, rollup: &Rollup) -> Result<(), String> {
        (self.check)(node, rollup)
    }
}
