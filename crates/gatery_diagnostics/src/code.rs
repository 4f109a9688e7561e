//! Diagnostic codes with category prefixes, one per error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// One variant per error kind in this workspace, plus `Config` for
/// `gatery_config`'s validation failures.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// A graph invariant the back-end cannot paper over (`DesignError`).
    Design,
    /// A name or node unresolvable in the current scope chain (`LookupFailure`).
    Lookup,
    /// An underlying filesystem failure (`IOError`).
    Io,
    /// A rendering case not handled (`Unsupported`).
    Unsupported,
    /// A callback issued in an order the recorder cannot represent (`RecorderError`).
    Recorder,
    /// Well-formed but semantically invalid export configuration.
    Config,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Design => 'D',
            Category::Lookup => 'L',
            Category::Io => 'I',
            Category::Unsupported => 'U',
            Category::Recorder => 'R',
            Category::Config => 'C',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric
/// identifier, displayed as e.g. `D101`, `L002`, `C014`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Design.prefix(), 'D');
        assert_eq!(Category::Lookup.prefix(), 'L');
        assert_eq!(Category::Io.prefix(), 'I');
        assert_eq!(Category::Unsupported.prefix(), 'U');
        assert_eq!(Category::Recorder.prefix(), 'R');
        assert_eq!(Category::Config.prefix(), 'C');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Design, 101);
        assert_eq!(format!("{code}"), "D101");
        let code = DiagnosticCode::new(Category::Lookup, 3);
        assert_eq!(format!("{code}"), "L003");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Recorder, 7);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
