//! Trigger recognizers
//!
//! Two independent recognizers that share no state:
//!
//! - [`ClickBurst`]: counts rapid logo clicks, resetting after a quiet gap,
//!   and requests `Normal → Uncanny` when the burst reaches its threshold.
//! - [`KeystrokeBuffer`]: keeps a rolling buffer of secret-word letters and
//!   reports a wake attempt when its tail spells the word.
//!
//! Neither recognizer changes the phase itself; the engine decides whether a
//! fired trigger is legal in the current phase.

pub mod click;
pub mod keystroke;

pub use click::{ClickBurst, ClickOutcome};
pub use keystroke::KeystrokeBuffer;

/// Result of evaluating a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerResult {
    /// Trigger fired with a human-readable reason
    Fired(String),
    /// Trigger conditions not met
    NotMet,
}

impl TriggerResult {
    /// Returns whether the trigger fired.
    #[must_use]
    pub const fn fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }
}
