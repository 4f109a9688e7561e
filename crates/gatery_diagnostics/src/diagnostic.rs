//! Structured diagnostic messages with severity, codes, labels, and fixes.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use crate::suggested_fix::SuggestedFix;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message uniformly rendering a failure from any
/// crate in the workspace — a VHDL design error, a recorder ordering
/// error, or an invalid export configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique error code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Additional annotated locations providing context.
    pub labels: Vec<Label>,
    /// Explanatory footnotes (e.g. "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g. "help: ...").
    pub help: Vec<String>,
    /// The captured call stack from graph construction, when the
    /// reporting crate had one on hand ("a capture of the user's call
    /// stack from graph construction"), innermost frame first.
    pub call_stack: Vec<String>,
    /// An auto-applicable fix, if available.
    pub fix: Option<SuggestedFix>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
            call_stack: Vec::new(),
            fix: None,
        }
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
            call_stack: Vec::new(),
            fix: None,
        }
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Attaches a captured call stack.
    pub fn with_call_stack(mut self, frames: Vec<String>) -> Self {
        self.call_stack = frames;
        self
    }

    /// Sets the suggested fix for this diagnostic.
    pub fn with_fix(mut self, fix: SuggestedFix) -> Self {
        self.fix = Some(fix);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Design, 101);
        let diag = Diagnostic::error(code, "port neither input nor output");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(format!("{}", diag.code), "D101");
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Lookup, 1);
        let diag = Diagnostic::error(code, "unresolved name")
            .with_label(Label::primary("root.s_foo", "not found in scope"))
            .with_note("scopes walked: root -> a1 -> e1")
            .with_help("check the allocation order")
            .with_call_stack(vec!["build_entity".into(), "convert".into()]);
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
        assert_eq!(diag.call_stack.len(), 2);
        assert!(diag.fix.is_none());
    }
}
