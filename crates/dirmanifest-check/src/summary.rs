//! Violation counts for reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::violation::InvariantViolation;

/// Aggregate counts over a violation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Occurrences per capability name.
    pub by_capability: BTreeMap<String, usize>,
    /// Occurrences per invariant name.
    pub by_invariant: BTreeMap<String, usize>,
}

impl ViolationSummary {
    /// Count a violation list.
    pub fn from_violations(violations: &[InvariantViolation]) -> Self {
        let mut summary = Self {
            total: violations.len(),
            ..Self::default()
        };

        for violation in violations {
            if violation.is_fatal() {
                summary.errors += 1;
            } else {
                summary.warnings += 1;
            }

            if !violation.capability.is_empty() {
                *summary
                    .by_capability
                    .entry(violation.capability.clone())
                    .or_insert(0) += 1;
            }
            if !violation.invariant.is_empty() {
                *summary
                    .by_invariant
                    .entry(violation.invariant.clone())
                    .or_insert(0) += 1;
            }
        }

        summary
    }

    /// Whether any fatal violation is present.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Check if there was nothing to report.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    fn violation(capability: &str, invariant: &str, severity: Severity) -> InvariantViolation {
        InvariantViolation::capability(capability, invariant, "test", severity)
    }

    #[test]
    fn test_counts() {
        let violations = vec![
            violation("size_buckets", "size_buckets.sum", Severity::Error),
            violation("size_buckets", "size_buckets.sum", Severity::Error),
            violation("extension_counts", "extensions.present_when_empty", Severity::Warning),
        ];

        let summary = ViolationSummary::from_violations(&violations);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.by_capability["size_buckets"], 2);
        assert_eq!(summary.by_invariant["extensions.present_when_empty"], 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_warnings_only() {
        let summary = ViolationSummary::from_violations(&[violation(
            "activity_span",
            "activity_span.covers_self",
            Severity::Warning,
        )]);
        assert!(!summary.has_errors());
        assert!(!summary.is_empty());
        assert!(ViolationSummary::default().is_empty());
    }
}
