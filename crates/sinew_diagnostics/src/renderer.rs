//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// warning[W101]: skeleton search exhausted its budget
///    = note: 20000 templates expanded
///    = help: raise search.max_expansions
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// Diagnostics below this severity are rendered as empty strings.
    pub min_severity: Severity,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer that shows everything from `min_severity` up.
    pub fn new(color: bool, min_severity: Severity) -> Self {
        Self {
            color,
            min_severity,
        }
    }

    fn header_color(&self, severity: Severity) -> (&'static str, &'static str) {
        if !self.color {
            return ("", "");
        }
        let start = match severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Note => "\x1b[1;36m",
            Severity::Help => "\x1b[1;32m",
        };
        (start, "\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        if diag.severity < self.min_severity {
            return String::new();
        }
        let (start, end) = self.header_color(diag.severity);
        let mut out = format!(
            "{start}{}[{}]{end}: {}\n",
            diag.severity, diag.code, diag.message
        );
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_warning_with_notes() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 102),
            "backtrack budget exhausted",
        )
        .with_note("2000 backtracks")
        .with_help("raise search.max_backtracks");

        let output = TerminalRenderer::new(false, Severity::Help).render(&diag);
        assert!(output.starts_with("warning[W102]: backtrack budget exhausted\n"));
        assert!(output.contains("= note: 2000 backtracks"));
        assert!(output.contains("= help: raise search.max_backtracks"));
    }

    #[test]
    fn below_threshold_is_empty() {
        let diag = Diagnostic::note(DiagnosticCode::new(Category::Routing, 1), "found paths");
        let output = TerminalRenderer::new(false, Severity::Warning).render(&diag);
        assert!(output.is_empty());
    }

    #[test]
    fn color_wraps_header() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 201), "unroutable");
        let output = TerminalRenderer::new(true, Severity::Help).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror[E201]\x1b[0m"));
    }
}
