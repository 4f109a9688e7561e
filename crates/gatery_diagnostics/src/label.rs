//! Labels that annotate a location within a diagnostic.
//!
//! The back-end this crate serves has no source-text database to point
//! into (the frontend expression builder that would own file
//! spans out of scope) — a [`Location`] is instead the scope-path or node
//! identity string the failing operation was already carrying (e.g. an
//! entity/instance path, or a `NodePort` debug form), the same identity
//! error to report.

use serde::{Deserialize, Serialize};

/// The visual style of a diagnostic label.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The primary label identifying the main offending location.
    Primary,
    /// A secondary label providing additional context.
    Secondary,
}

/// A human-readable location within the HLIM graph or generated AST: a
/// scope path, node identity, or file path, depending on what the
/// reporting crate had on hand.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Location(pub String);

/// An annotated location within a diagnostic, with an explanatory message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The location this label annotates.
    pub location: Location,
    /// The message displayed alongside the location.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label (the main offending location).
    pub fn primary(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Location(location.into()),
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label (additional context).
    pub fn secondary(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: Location(location.into()),
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_label() {
        let label = Label::primary("root/a1/e1.out", "expected type");
        assert_eq!(label.style, LabelStyle::Primary);
        assert_eq!(label.location.0, "root/a1/e1.out");
    }

    #[test]
    fn secondary_label() {
        let label = Label::secondary("root/a1", "declared here");
        assert_eq!(label.style, LabelStyle::Secondary);
    }
}
