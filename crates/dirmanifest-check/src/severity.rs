//! Violation severity.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::Level;

/// How serious an invariant violation is.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Breaks a declared guarantee; the manifest is invalid.
    #[default]
    Error,
    /// Weakens a guarantee; the data is still usable.
    Warning,
}

impl Severity {
    /// Whether a violation of this severity fails validation.
    pub fn is_fatal(self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Log level used when reporting a violation of this severity.
    pub fn level(self) -> Level {
        match self {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARN,
        }
    }
}
