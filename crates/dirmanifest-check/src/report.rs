//! Structured logging of validation results.
//!
//! Violations become `tracing` events at the level their severity maps to;
//! the subscriber installed by the caller decides how they are rendered.

use itertools::Itertools;
use tracing::Level;

use crate::summary::ViolationSummary;
use crate::validator::ValidationReport;
use crate::violation::InvariantViolation;

macro_rules! violation_event {
    ($level:expr, $v:expr) => {
        tracing::event!(
            target: "dirmanifest::validation",
            $level,
            path = $v.path.as_deref().unwrap_or("-"),
            capability = %$v.capability,
            invariant = %$v.invariant,
            severity = %$v.severity,
            cause = $v.cause.as_deref().unwrap_or(""),
            "invariant violation: {}",
            $v.description
        )
    };
}

/// Emit one violation at its severity's level.
pub fn log_violation(violation: &InvariantViolation) {
    // Event levels must be constants at the callsite
    if violation.severity.level() == Level::ERROR {
        violation_event!(Level::ERROR, violation);
    } else {
        violation_event!(Level::WARN, violation);
    }
}

/// Emit the summary counts.
pub fn log_summary(summary: &ViolationSummary) {
    tracing::info!(
        target: "dirmanifest::validation",
        total = summary.total,
        errors = summary.errors,
        warnings = summary.warnings,
        by_capability = ?summary.by_capability,
        "validation summary"
    );
}

/// Emit every violation, fatal ones first, followed by the summary.
pub fn log_report(report: &ValidationReport) {
    for violation in report.violations.iter().sorted_by_key(|v| v.severity) {
        log_violation(violation);
    }
    log_summary(&report.summary());
}
