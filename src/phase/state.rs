//! Phase values and transition records
//!
//! The phase is persisted as a bare integer (`0`, `1`, `2`); anything else
//! in a stored record makes the record unreadable.

use serde::{Deserialize, Serialize};

/// Narrative phase, strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    /// The site behaves like an ordinary promotional page.
    #[default]
    Normal,
    /// Reality is fraying: glitches and subliminal hints.
    Uncanny,
    /// The finale has broken through.
    Intrusion,
}

impl Phase {
    /// All phases in order.
    pub const ALL: [Self; 3] = [Self::Normal, Self::Uncanny, Self::Intrusion];

    /// Returns the numeric index of this phase.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Uncanny => 1,
            Self::Intrusion => 2,
        }
    }

    /// Returns the phase that follows this one, if any.
    ///
    /// There is no skipping: `Normal` only ever advances to `Uncanny`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Normal => Some(Self::Uncanny),
            Self::Uncanny => Some(Self::Intrusion),
            Self::Intrusion => None,
        }
    }

    /// Returns the lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Uncanny => "uncanny",
            Self::Intrusion => "intrusion",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.index()
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Uncanny),
            2 => Ok(Self::Intrusion),
            other => Err(format!("phase {other} out of range (0..=2)")),
        }
    }
}

/// Record of an applied phase transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Phase we transitioned from
    pub from: Phase,
    /// Phase we transitioned to
    pub to: Phase,
    /// Human-readable reason the trigger fired
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_index() {
        assert!(Phase::Normal < Phase::Uncanny);
        assert!(Phase::Uncanny < Phase::Intrusion);
        for window in Phase::ALL.windows(2) {
            assert_eq!(window[0].next(), Some(window[1]));
        }
        assert_eq!(Phase::Intrusion.next(), None);
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Phase::Uncanny).unwrap(), "1");
        let parsed: Phase = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Phase::Intrusion);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(serde_json::from_str::<Phase>("3").is_err());
        assert!(serde_json::from_str::<Phase>("-1").is_err());
        assert!(serde_json::from_str::<Phase>("\"uncanny\"").is_err());
    }

    #[test]
    fn display_name() {
        assert_eq!(Phase::Intrusion.to_string(), "intrusion");
    }
}
