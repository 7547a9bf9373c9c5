//! Validation error type.

use thiserror::Error;

use crate::violation::InvariantViolation;

/// A validation run found at least one fatal violation.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {errors} fatal violation(s), {warnings} warning(s)")]
pub struct ValidationFailed {
    pub errors: usize,
    pub warnings: usize,
    /// Every violation of the run, both severities.
    pub violations: Vec<InvariantViolation>,
}
