//! The shared report channel of a routing run.
//!
//! Every routing job pushes its progress notes, budget warnings, and
//! unroutable-lane errors into one [`DiagnosticSink`]. Diagnostics below the
//! sink's minimum severity are counted and dropped at emit time, so a long
//! run at `min_severity = "warning"` does not retain one note per tile-path
//! search.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics from concurrent routing jobs.
pub struct DiagnosticSink {
    retained: Mutex<Vec<Diagnostic>>,
    min_severity: Severity,
    errors: AtomicUsize,
    suppressed: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a sink that keeps every diagnostic.
    pub fn new() -> Self {
        Self::with_min_severity(Severity::Help)
    }

    /// Creates a sink that drops diagnostics less severe than `min_severity`.
    pub fn with_min_severity(min_severity: Severity) -> Self {
        Self {
            retained: Mutex::new(Vec::new()),
            min_severity,
            errors: AtomicUsize::new(0),
            suppressed: AtomicUsize::new(0),
        }
    }

    fn retained(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.retained.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The least severe level this sink keeps.
    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    /// Records `diag`, or counts it as suppressed if it is below the threshold.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity < self.min_severity {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if diag.severity.is_error() {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.retained().push(diag);
    }

    /// Returns `true` once any lane has been reported unroutable.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Errors emitted so far; draining the sink does not reset it.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Diagnostics dropped for being below the threshold.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// Retained diagnostics carrying `code`.
    pub fn count_code(&self, code: DiagnosticCode) -> usize {
        self.retained().iter().filter(|d| d.code == code).count()
    }

    /// Drains the retained diagnostics in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.retained())
    }

    /// A copy of the retained diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.retained().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticSink")
            .field("min_severity", &self.min_severity)
            .field("error_count", &self.error_count())
            .field("suppressed", &self.suppressed_count())
            .finish_non_exhaustive()
    }
}
