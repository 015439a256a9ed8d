//! Diagnostic records, severity management, and terminal rendering.
//!
//! The router reports progress and problems as structured [`Diagnostic`]
//! records rather than free-form log lines. Concurrent routing jobs share one
//! thread-safe [`DiagnosticSink`]; a [`DiagnosticRenderer`] formats the
//! accumulated records for a terminal.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
