//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;

/// Renders diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[D101]: port is neither input nor output
///   --> root/area1/e1.clk
///    = note: scopes walked: root -> a1 -> e1
///    = help: check the allocation order
/// ```
pub struct TerminalRenderer {
    /// Whether to emit ANSI color codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let severity_color = if diag.severity.is_error() { "31" } else { "33" };
        let mut out = format!(
            "{}[{}]: {}\n",
            self.paint(severity_color, &diag.severity.to_string()),
            diag.code,
            diag.message
        );

        for label in &diag.labels {
            let marker = match label.style {
                LabelStyle::Primary => "-->",
                LabelStyle::Secondary => "...",
            };
            out.push_str(&format!("  {marker} {}: {}\n", label.location.0, label.message));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        if !diag.call_stack.is_empty() {
            out.push_str(&format!("   = call stack: {}\n", diag.call_stack.join(" <- ")));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;

    #[test]
    fn render_error_with_label() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Design, 101), "name clash")
            .with_label(Label::primary("root.s_foo", "already allocated here"));
        let renderer = TerminalRenderer::new(false);
        let out = renderer.render(&diag);
        assert!(out.contains("error[D101]: name clash"));
        assert!(out.contains("root.s_foo: already allocated here"));
    }

    #[test]
    fn render_warning_with_notes() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Unsupported, 1), "heads up")
            .with_note("non-fatal")
            .with_help("ignore if expected");
        let renderer = TerminalRenderer::new(false);
        let out = renderer.render(&diag);
        assert!(out.contains("warning[U001]: heads up"));
        assert!(out.contains("= note: non-fatal"));
        assert!(out.contains("= help: ignore if expected"));
    }

    #[test]
    fn render_with_call_stack() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Lookup, 1), "missing name")
            .with_call_stack(vec!["build_entity".into(), "convert".into()]);
        let renderer = TerminalRenderer::new(false);
        let out = renderer.render(&diag);
        assert!(out.contains("build_entity <- convert"));
    }

    #[test]
    fn color_wraps_severity() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Io, 1), "disk full");
        let renderer = TerminalRenderer::new(true);
        let out = renderer.render(&diag);
        assert!(out.contains("\x1b[31m"));
    }
}
