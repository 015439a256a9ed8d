//! Diagnostic severities, from routine progress up to unroutable lanes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
///
/// Variants are declared least severe first, so `Ord` doubles as the
/// threshold test used by [`DiagnosticSink`](crate::DiagnosticSink). In
/// `sinew.toml` they are spelled in lowercase (`min_severity = "warning"`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Verbose detail beneath a note.
    Help,
    /// Routine progress: paths found, templates built.
    Note,
    /// A search that hit its budget and gave up.
    Warning,
    /// A lane that could not be routed.
    Error,
}

impl Severity {
    /// Returns `true` for [`Error`](Severity::Error).
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// The lowercase label used in rendered output and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Help => "help",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
