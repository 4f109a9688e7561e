//! Common result and error types shared across the gatery crates.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in the tool, not a
/// design error). Design-facing errors (malformed HLIM graphs, missing
/// entities, I/O failures) are reported through each crate's own `thiserror`
/// error enum instead.
pub type GateryResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the tool, not a problem with the
/// input design.
///
/// These should never occur during normal operation. If one does, it means
/// an invariant the back-end relies on (a fully elaborated, type-correct
/// HLIM graph) was violated upstream.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
