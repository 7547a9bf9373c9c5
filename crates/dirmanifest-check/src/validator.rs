//! Capability validator.

use std::collections::BTreeMap;

use rayon::prelude::*;

use dirmanifest_core::{Manifest, Node, Rollup, RollupCapabilities};

use crate::error::ValidationFailed;
use crate::invariant::Invariant;
use crate::registry::{CapabilityRegistry, HAS_INVARIANTS, STRUCTURAL};
use crate::severity::Severity;
use crate::summary::ViolationSummary;
use crate::violation::InvariantViolation;

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Every violation found, in evaluation order.
    pub violations: Vec<InvariantViolation>,
    /// Whether any violation is fatal.
    pub fatal: bool,
}

impl ValidationReport {
    fn new(violations: Vec<InvariantViolation>) -> Self {
        let fatal = violations.iter().any(InvariantViolation::is_fatal);
        Self { violations, fatal }
    }

    /// Whether the manifest failed validation.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Check if no violation of any severity was found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fatal violations.
    pub fn errors(&self) -> impl Iterator<Item = &InvariantViolation> {
        self.violations.iter().filter(|v| v.is_fatal())
    }

    /// Non-fatal violations.
    pub fn warnings(&self) -> impl Iterator<Item = &InvariantViolation> {
        self.violations.iter().filter(|v| !v.is_fatal())
    }

    /// Aggregate counts.
    pub fn summary(&self) -> ViolationSummary {
        ViolationSummary::from_violations(&self.violations)
    }

    /// Convert into a `Result`: `Ok` with the (non-fatal) violations, or
    /// `Err` carrying all of them when any is fatal.
    pub fn into_result(self) -> Result<Vec<InvariantViolation>, ValidationFailed> {
        if !self.fatal {
            return Ok(self.violations);
        }
        let summary = ViolationSummary::from_violations(&self.violations);
        Err(ValidationFailed {
            errors: summary.errors,
            warnings: summary.warnings,
            violations: self.violations,
        })
    }
}

/// Evaluates declared capabilities against rolled-up directories.
///
/// Evaluation never stops at the first fatal violation. Output order is
/// fixed: structural invariants first, then capabilities by name; within
/// each, directories by path and invariants in registry order.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    registry: &'a CapabilityRegistry,
}

impl<'a> Validator<'a> {
    /// Create a validator over a registry.
    pub fn new(registry: &'a CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// Validate a manifest against its own declaration.
    pub fn validate_manifest(&self, manifest: &Manifest) -> ValidationReport {
        self.validate(manifest.rollup_capabilities(), &manifest.nodes)
    }

    /// Validate nodes against a capability declaration.
    pub fn validate(&self, capabilities: &RollupCapabilities, nodes: &[Node]) -> ValidationReport {
        self.validate_declared(capabilities.declared(), nodes)
    }

    /// Validate nodes against capabilities declared by name. Names the
    /// registry does not know are ignored.
    pub fn validate_declared<I, S>(&self, declared: I, nodes: &[Node]) -> ValidationReport
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut enabled: BTreeMap<String, bool> = BTreeMap::new();
        for (name, on) in declared {
            *enabled.entry(name.as_ref().to_string()).or_insert(false) |= on;
        }

        let mut dirs: Vec<(&Node, &Rollup)> = nodes
            .iter()
            .filter(|n| n.is_dir)
            .filter_map(|n| n.rollup.as_ref().map(|r| (n, r)))
            .collect();
        dirs.sort_by(|a, b| a.0.path.cmp(&b.0.path));

        let mut violations = evaluate(STRUCTURAL, self.registry.structural(), &dirs);

        for (capability, _) in enabled.iter().filter(|(_, on)| **on) {
            let Some(invariants) = self.registry.invariants(capability) else {
                tracing::debug!(capability = %capability, "no invariants registered, ignoring");
                continue;
            };

            if invariants.is_empty() {
                violations.push(InvariantViolation::capability(
                    capability,
                    HAS_INVARIANTS,
                    "declared capability has no invariants",
                    Severity::Error,
                ));
                continue;
            }

            violations.extend(evaluate(capability, invariants, &dirs));
        }

        let report = ValidationReport::new(violations);
        tracing::debug!(
            directories = dirs.len(),
            violations = report.violations.len(),
            fatal = report.fatal,
            "validation finished"
        );
        report
    }
}

/// Run every invariant over every directory, preserving directory order.
fn evaluate(
    capability: &str,
    invariants: &[Invariant],
    dirs: &[(&Node, &Rollup)],
) -> Vec<InvariantViolation> {
    if invariants.is_empty() {
        return Vec::new();
    }
    dirs.par_iter()
        .flat_map_iter(|&(node, rollup)| {
            invariants.iter().filter_map(move |invariant| {
                invariant
                    .check(node, rollup)
                    .err()
                    .map(|cause| InvariantViolation::at(&node.path, capability, invariant, cause))
            })
        })
        .collect()
}
