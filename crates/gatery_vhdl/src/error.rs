//! Error taxonomy for the VHDL back-end.
//!
//! Errors abort the current emission and bubble to the top-level
//! `writeVHDL`/`convert` caller. There is no local recovery or retry;
//! a failed export leaves on-disk state undefined and callers are expected
//! to rebuild from scratch.

use std::path::PathBuf;

/// An error raised while converting a circuit to VHDL or writing it out.
#[derive(Debug, thiserror::Error)]
pub enum VhdlError {
    /// The HLIM graph violates an invariant the back-end cannot paper over:
    /// an unresolvable name clash, a port that is neither input nor output,
    /// or a simulation-only source driving a synthesizable sink.
    #[error("design error: {0}")]
    Design(String),

    /// A name or node could not be resolved in the current scope chain.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// A filesystem operation failed during emission.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A rendering case that the back-end does not (yet) handle, e.g. an
    /// unknown connection-type interpretation.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl VhdlError {
    /// Shorthand for [`VhdlError::Design`].
    pub fn design(message: impl Into<String>) -> Self {
        VhdlError::Design(message.into())
    }

    /// Shorthand for [`VhdlError::Lookup`].
    pub fn lookup(message: impl Into<String>) -> Self {
        VhdlError::Lookup(message.into())
    }

    /// Shorthand for [`VhdlError::Unsupported`].
    pub fn unsupported(message: impl Into<String>) -> Self {
        VhdlError::Unsupported(message.into())
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VhdlError::Io {
            path: path.into(),
            source,
        }
    }
}

/// The standard result type for the VHDL back-end.
pub type VhdlResult<T> = Result<T, VhdlError>;

impl From<&VhdlError> for gatery_diagnostics::Diagnostic {
    fn from(err: &VhdlError) -> Self {
        use gatery_diagnostics::{Category, Diagnostic, DiagnosticCode};

        match err {
            VhdlError::Design(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Design, 1), msg.clone())
            }
            VhdlError::Lookup(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Lookup, 1), msg.clone())
            }
            VhdlError::Io { path, source } => Diagnostic::error(
                DiagnosticCode::new(Category::Io, 1),
                format!("I/O error: {source}"),
            )
            .with_note(format!("path: {}", path.display())),
            VhdlError::Unsupported(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Unsupported, 1), msg.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_error_message() {
        let err = VhdlError::design("port neither input nor output");
        assert_eq!(err.to_string(), "design error: port neither input nor output");
    }

    #[test]
    fn io_error_includes_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = VhdlError::io("/tmp/out.vhd", source);
        assert!(err.to_string().contains("/tmp/out.vhd"));
    }

    #[test]
    fn converts_to_diagnostic() {
        let err = VhdlError::lookup("s_foo not found");
        let diag: gatery_diagnostics::Diagnostic = (&err).into();
        assert_eq!(diag.code.to_string(), "L001");
        assert_eq!(diag.message, "s_foo not found");
    }
}
