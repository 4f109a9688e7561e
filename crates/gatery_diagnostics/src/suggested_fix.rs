//! Auto-applicable fix suggestions for diagnostics.

use serde::{Deserialize, Serialize};

/// One proposed textual replacement at a named location, e.g. a renamed
/// identifier or a corrected configuration key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Replacement {
    /// The location the replacement applies to.
    pub location: String,
    /// The replacement text.
    pub new_text: String,
}

/// A suggested fix that a caller may choose to apply.
///
/// A fix consists of a human-readable message describing the change and
/// one or more [`Replacement`]s that together implement the fix.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestedFix {
    /// A description of what this fix does.
    pub message: String,
    /// The set of replacements that implement this fix.
    pub replacements: Vec<Replacement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_fix() {
        let fix = SuggestedFix {
            message: "rename the colliding signal".to_string(),
            replacements: vec![Replacement {
                location: "root.s_foo".to_string(),
                new_text: "s_foo_2".to_string(),
            }],
        };
        assert_eq!(fix.replacements.len(), 1);
    }
}
