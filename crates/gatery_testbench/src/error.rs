//! Error taxonomy for testbench recording, layered the same way as
//! `gatery_vhdl`'s own [`gatery_vhdl::VhdlError`].

use std::path::PathBuf;

/// An error raised while building or writing a testbench.
#[derive(Debug, thiserror::Error)]
pub enum TestbenchError {
    /// The recorded trace is inconsistent with the wrapped design: an
    /// assert or override was requested against a node port that does not
    /// resolve to one of the root entity's I/O pins.
    #[error("testbench design error: {0}")]
    Design(String),

    /// A name lookup against the wrapped AST's namespace failed.
    #[error("testbench lookup failed: {0}")]
    Lookup(String),

    /// A filesystem operation failed while writing the testbench file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The recorder was driven out of its expected event sequence, e.g. a
    /// tick recorded before the header was ever written.
    #[error("testbench recorder error: {0}")]
    Recorder(String),
}

impl TestbenchError {
    /// Shorthand for [`TestbenchError::Design`].
    pub fn design(message: impl Into<String>) -> Self {
        TestbenchError::Design(message.into())
    }

    /// Shorthand for [`TestbenchError::Lookup`].
    pub fn lookup(message: impl Into<String>) -> Self {
        TestbenchError::Lookup(message.into())
    }

    /// Shorthand for [`TestbenchError::Recorder`].
    pub fn recorder(message: impl Into<String>) -> Self {
        TestbenchError::Recorder(message.into())
    }

    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TestbenchError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<gatery_vhdl::VhdlError> for TestbenchError {
    fn from(err: gatery_vhdl::VhdlError) -> Self {
        match err {
            gatery_vhdl::VhdlError::Design(msg) => TestbenchError::Design(msg),
            gatery_vhdl::VhdlError::Lookup(msg) => TestbenchError::Lookup(msg),
            gatery_vhdl::VhdlError::Io { path, source } => TestbenchError::Io { path, source },
            gatery_vhdl::VhdlError::Unsupported(msg) => TestbenchError::Design(msg),
        }
    }
}

/// The standard result type for testbench recording.
pub type TestbenchResult<T> = Result<T, TestbenchError>;

impl From<&TestbenchError> for gatery_diagnostics::Diagnostic {
    fn from(err: &TestbenchError) -> Self {
        use gatery_diagnostics::{Category, Diagnostic, DiagnosticCode};

        match err {
            TestbenchError::Design(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Design, 1), msg.clone())
            }
            TestbenchError::Lookup(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Lookup, 1), msg.clone())
            }
            TestbenchError::Io { path, source } => Diagnostic::error(
                DiagnosticCode::new(Category::Io, 1),
                format!("I/O error: {source}"),
            )
            .with_note(format!("path: {}", path.display())),
            TestbenchError::Recorder(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Recorder, 1), msg.clone())
            }
        }
    }
}
