//! Logo click-burst recognizer

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::ClickConfig;
use crate::phase::Phase;
use crate::store::SessionState;

use super::TriggerResult;

/// What a single logo click produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Burst count after this click.
    pub count: u32,
    /// Shake strength for counts in `[feedback_from, threshold)`, starting at 1.
    pub intensity: Option<u32>,
    /// Whether the burst requests `Normal → Uncanny`.
    pub trigger: TriggerResult,
}

/// Counts rapid clicks on the site logo.
///
/// The count lives in the session record, so a burst survives reloads as
/// long as the clicks keep coming inside the window.
#[derive(Debug, Clone)]
pub struct ClickBurst {
    window: Duration,
    threshold: u32,
    feedback_from: u32,
}

impl ClickBurst {
    /// Creates a recognizer.
    #[must_use]
    pub const fn new(window: Duration, threshold: u32, feedback_from: u32) -> Self {
        Self {
            window,
            threshold,
            feedback_from,
        }
    }

    /// Creates a recognizer from configuration.
    #[must_use]
    pub const fn from_config(config: &ClickConfig) -> Self {
        Self::new(config.window, config.threshold, config.feedback_from)
    }

    /// Registers a click at `now` against `state`.
    ///
    /// Resets the count when more than the window has passed since the last
    /// click, then increments it and records `now`. The trigger only fires
    /// while the record is still in [`Phase::Normal`], so clicks past the
    /// threshold never fire twice.
    pub fn register(&self, state: &mut SessionState, now: DateTime<Utc>) -> ClickOutcome {
        if let Some(last) = state.last_click_time {
            let window = TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX);
            if now.signed_duration_since(last) > window {
                state.logo_clicks = 0;
            }
        }
        state.last_click_time = Some(now);
        state.logo_clicks = state.logo_clicks.saturating_add(1);

        let count = state.logo_clicks;
        let intensity = (self.feedback_from..self.threshold)
            .contains(&count)
            .then(|| count - self.feedback_from + 1);

        let trigger = if state.phase == Phase::Normal && count >= self.threshold {
            TriggerResult::Fired(format!(
                "logo clicked {count} times within {}",
                humantime::format_duration(self.window)
            ))
        } else {
            TriggerResult::NotMet
        };

        ClickOutcome {
            count,
            intensity,
            trigger,
        }
    }
}
