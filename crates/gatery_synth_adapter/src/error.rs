//! Error taxonomy for the synthesis-tool adapter, layered the same way as
//! `gatery_vhdl`'s own [`gatery_vhdl::VhdlError`].

use std::path::PathBuf;

/// An error raised while resolving attributes or writing an auxiliary file.
#[derive(Debug, thiserror::Error)]
pub enum SynthAdapterError {
    /// A path attribute's start or end endpoint does not resolve to any
    /// declared scope (its owning node has no enclosing entity, or the
    /// port was never allocated a name).
    #[error("synthesis adapter design error: {0}")]
    Design(String),

    /// A filesystem operation failed while writing an auxiliary file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An attribute or connection-type shape this adapter does not know how
    /// to render.
    #[error("synthesis adapter does not support: {0}")]
    Unsupported(String),
}

impl SynthAdapterError {
    /// Shorthand for [`SynthAdapterError::Design`].
    pub fn design(message: impl Into<String>) -> Self {
        SynthAdapterError::Design(message.into())
    }

    /// Shorthand for [`SynthAdapterError::Unsupported`].
    pub fn unsupported(message: impl Into<String>) -> Self {
        SynthAdapterError::Unsupported(message.into())
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SynthAdapterError::Io { path: path.into(), source }
    }
}

impl From<gatery_vhdl::VhdlError> for SynthAdapterError {
    fn from(err: gatery_vhdl::VhdlError) -> Self {
        match err {
            gatery_vhdl::VhdlError::Design(msg) => SynthAdapterError::Design(msg),
            gatery_vhdl::VhdlError::Lookup(msg) => SynthAdapterError::Design(msg),
            gatery_vhdl::VhdlError::Io { path, source } => SynthAdapterError::Io { path, source },
            gatery_vhdl::VhdlError::Unsupported(msg) => SynthAdapterError::Unsupported(msg),
        }
    }
}

/// The standard result type for the synthesis-tool adapter.
pub type SynthAdapterResult<T> = Result<T, SynthAdapterError>;

impl From<&SynthAdapterError> for gatery_diagnostics::Diagnostic {
    fn from(err: &SynthAdapterError) -> Self {
        use gatery_diagnostics::{Category, Diagnostic, DiagnosticCode};

        match err {
            SynthAdapterError::Design(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Design, 1), msg.clone())
            }
            SynthAdapterError::Io { path, source } => Diagnostic::error(
                DiagnosticCode::new(Category::Io, 1),
                format!("I/O error: {source}"),
            )
            .with_note(format!("path: {}", path.display())),
            SynthAdapterError::Unsupported(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Unsupported, 1), msg.clone())
            }
        }
    }
}
