//! The CLI's own error type: a thin wrapper flattening every downstream
//! crate's error into one enum so `main` has a single place to render a
//! [`gatery_diagnostics::Diagnostic`] before exiting non-zero.

use std::path::PathBuf;

/// Errors surfaced by a `gatery` subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A circuit or trace fixture file was malformed.
    #[error("malformed fixture: {0}")]
    Fixture(String),

    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] gatery_config::ConfigError),

    /// VHDL AST construction or writing failed.
    #[error(transparent)]
    Vhdl(#[from] gatery_vhdl::VhdlError),

    /// Testbench recording failed.
    #[error(transparent)]
    Testbench(#[from] gatery_testbench::TestbenchError),

    /// The synthesis-tool adapter failed.
    #[error(transparent)]
    SynthAdapter(#[from] gatery_synth_adapter::SynthAdapterError),
}

/// The standard result type for `gatery` subcommands.
pub type CliResult<T> = Result<T, CliError>;

impl From<&CliError> for gatery_diagnostics::Diagnostic {
    fn from(err: &CliError) -> Self {
        use gatery_diagnostics::{Category, Diagnostic, DiagnosticCode};

        match err {
            CliError::Io { path, source } => Diagnostic::error(
                DiagnosticCode::new(Category::Io, 1),
                format!("I/O error: {source}"),
            )
            .with_note(format!("path: {}", path.display())),
            CliError::Fixture(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Design, 1), msg.clone())
            }
            CliError::Config(e) => e.into(),
            CliError::Vhdl(e) => e.into(),
            CliError::Testbench(e) => e.into(),
            CliError::SynthAdapter(e) => e.into(),
        }
    }
}
