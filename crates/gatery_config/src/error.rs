//! Error taxonomy for configuration loading and validation.

/// Errors that can occur while loading or validating a [`crate::GateryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed or deserialized.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration is well-formed but semantically invalid, e.g.
    /// `write_mode = file_per_partition` combined with `write_constraints`
    /// when the destination cannot be created.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// The standard result type for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<&ConfigError> for gatery_diagnostics::Diagnostic {
    fn from(err: &ConfigError) -> Self {
        use gatery_diagnostics::{Category, Diagnostic, DiagnosticCode};

        match err {
            ConfigError::Io(source) => Diagnostic::error(
                DiagnosticCode::new(Category::Io, 1),
                format!("I/O error: {source}"),
            ),
            ConfigError::Parse(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Config, 1), msg.clone())
            }
            ConfigError::Validation(msg) => {
                Diagnostic::error(DiagnosticCode::new(Category::Config, 2), msg.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation_error() {
        let err = ConfigError::Validation("destination is not creatable".to_string());
        assert_eq!(
            format!("{err}"),
            "invalid configuration: destination is not creatable"
        );
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::Parse("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::Io(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }

    #[test]
    fn converts_to_diagnostic() {
        let err = ConfigError::Validation("bad combo".to_string());
        let diag: gatery_diagnostics::Diagnostic = (&err).into();
        assert_eq!(diag.code.to_string(), "C002");
    }
}
