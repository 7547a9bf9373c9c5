//! Invariant violation records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::invariant::Invariant;
use crate::severity::Severity;

/// A failed invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    /// Directory the check failed on; `None` for capability-scoped findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub capability: String,
    pub invariant: String,
    pub description: String,
    pub severity: Severity,
    /// Why the check failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl InvariantViolation {
    /// Violation of `invariant` on the directory at `path`.
    pub fn at(path: &str, capability: &str, invariant: &Invariant, cause: String) -> Self {
        Self {
            path: Some(path.to_string()),
            capability: capability.to_string(),
            invariant: invariant.name.to_string(),
            description: invariant.description.to_string(),
            severity: invariant.severity,
            cause: Some(cause),
        }
    }

    /// Capability-scoped violation with no path.
    pub fn capability(
        capability: &str,
        invariant: &str,
        description: &str,
        severity: Severity,
    ) -> Self {
        Self {
            path: None,
            capability: capability.to_string(),
            invariant: invariant.to_string(),
            description: description.to_string(),
            severity,
            cause: None,
        }
    }

    /// Whether this violation fails validation.
    pub fn is_fatal(&self) -> bool {
        self.severity.is_fatal()
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{path}: ")?;
        }
        write!(
            f,
            "capability {} invariant {} failed ({})",
            self.capability, self.invariant, self.severity
        )?;
        match &self.cause {
            Some(cause) => write!(f, ": {cause}"),
            None => write!(f, ": {}", self.description),
        }
    }
}
