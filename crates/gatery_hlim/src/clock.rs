//! Clocks and their reset policy.

use gatery_common::{Frequency, Ident};
use serde::{Deserialize, Serialize};

use crate::ids::ClockId;

/// How a clock domain's registers are reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetType {
    /// Registers in this domain carry no reset signal.
    None,
    /// Reset is sampled synchronously with the clock edge.
    Synchronous,
    /// Reset is asynchronous; it takes effect independent of the clock edge.
    Asynchronous,
}

impl ResetType {
    /// `true` unless the reset policy is [`ResetType::None`].
    pub fn has_reset_signal(&self) -> bool {
        !matches!(self, ResetType::None)
    }
}

/// A clock domain referenced by clock-sensitive nodes (registers, memories).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    /// The unique ID of this clock.
    pub id: ClockId,
    /// The desired (pre-allocation) clock name.
    pub name: Ident,
    /// The clock frequency, used when emitting synthesis clock constraints.
    pub frequency: Frequency,
    /// The reset policy for registers driven by this clock.
    pub reset_type: ResetType,
    /// The desired name of the reset signal, if `reset_type` carries one.
    pub reset_name: Option<Ident>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_no_reset_signal() {
        assert!(!ResetType::None.has_reset_signal());
    }

    #[test]
    fn sync_and_async_have_reset_signal() {
        assert!(ResetType::Synchronous.has_reset_signal());
        assert!(ResetType::Asynchronous.has_reset_signal());
    }
}
