//! Diagnostic collection.
//!
//! This back-end runs translation and emission single-threaded and
//! synchronously, so `DiagnosticSink` is a plain trait rather than a
//! thread-safe structure: a `VecDiagnosticSink` collects for tests, and the
//! CLI's `TerminalRenderer` can double as a sink that renders as it goes.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Anything that can receive diagnostics as they're produced.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// A `Vec`-backed collector, the sink used by tests and by any caller that
/// wants to gather diagnostics before deciding how to present them.
#[derive(Debug, Default)]
pub struct VecDiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl VecDiagnosticSink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any error-severity diagnostics have been emitted.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// The number of error-severity diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// All diagnostics collected so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl DiagnosticSink for VecDiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    fn make_error() -> Diagnostic {
        Diagnostic::error(DiagnosticCode::new(Category::Design, 1), "bad graph")
    }

    fn make_warning() -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::new(Category::Unsupported, 2), "heads up")
    }

    #[test]
    fn empty_sink() {
        let sink = VecDiagnosticSink::new();
        assert!(!sink.has_errors());
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn emit_error_counts() {
        let mut sink = VecDiagnosticSink::new();
        sink.emit(make_error());
        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn emit_warning_not_error() {
        let mut sink = VecDiagnosticSink::new();
        sink.emit(make_warning());
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn take_all_drains() {
        let mut sink = VecDiagnosticSink::new();
        sink.emit(make_error());
        sink.emit(make_warning());
        let all = sink.take_all();
        assert_eq!(all.len(), 2);
        assert!(sink.diagnostics().is_empty());
    }
}
