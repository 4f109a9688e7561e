//! Error type for memory-map lookups, layered the same way as the other
//! crates in this workspace.

/// An error raised while looking up an entry in a [`crate::MemoryMap`].
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A child index was out of range for the entry being indexed.
    #[error("memory map index {index} out of range (entry has {children} children)")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of children the entry actually has.
        children: u32,
    },

    /// No child with the given name exists under the entry being indexed.
    #[error("memory map has no child named '{name}'")]
    NoSuchChild {
        /// The name that was looked up.
        name: String,
    },
}

impl DriverError {
    /// Shorthand for [`DriverError::IndexOutOfRange`].
    pub fn index_out_of_range(index: usize, children: u32) -> Self {
        DriverError::IndexOutOfRange { index, children }
    }

    /// Shorthand for [`DriverError::NoSuchChild`].
    pub fn no_such_child(name: impl Into<String>) -> Self {
        DriverError::NoSuchChild { name: name.into() }
    }
}

/// The standard result type for memory-map lookups.
pub type DriverResult<T> = Result<T, DriverError>;

impl From<&DriverError> for gatery_diagnostics::Diagnostic {
    fn from(err: &DriverError) -> Self {
        use gatery_diagnostics::{Category, Diagnostic, DiagnosticCode};

        Diagnostic::error(DiagnosticCode::new(Category::Design, 1), err.to_string())
    }
}
