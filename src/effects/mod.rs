//! Effect and navigation interfaces
//!
//! The engine decides *when* an effect happens; implementations of these
//! traits decide what it looks like. All calls are fire-and-forget and may
//! arrive from page-scoped timer tasks, hence `Send + Sync`.

pub mod recorder;

use serde::Serialize;

use crate::phase::Phase;

pub use recorder::{Call, Recorder};

/// One tick of a running ambient effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "word", rename_all = "snake_case")]
pub enum AmbientTick {
    /// Full-screen flash overlay opportunity.
    Flash,
    /// Variable-text scramble opportunity.
    TextGlitch,
    /// Subliminal hint showing `word`.
    Hint(String),
}

/// Terminal call to action shown at the end of the finale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallToAction {
    /// Button label.
    pub label: String,
    /// External destination.
    pub url: String,
}

/// Renders narrative effects.
pub trait EffectDispatcher: Send + Sync {
    /// A phase was just entered; render its one-shot entry effect.
    fn on_phase_enter(&self, phase: Phase);

    /// A page loaded while `phase` is current; restore its ambient look.
    fn on_ambient_resume(&self, phase: Phase);

    /// A running ambient effect ticked.
    fn on_ambient_tick(&self, _tick: AmbientTick) {}

    /// The logo click burst is building; `intensity` starts at 1.
    fn on_click_feedback(&self, _intensity: u32) {}

    /// A secret-word letter was typed.
    fn on_key_echo(&self, _key: char) {}

    /// The finale message has been revealed up to `revealed`.
    fn on_reveal(&self, _revealed: &str) {}

    /// The finale reveal finished; present the call to action.
    fn on_finale_complete(&self, cta: &CallToAction);
}

/// Performs navigation requests.
pub trait Navigator: Send + Sync {
    /// Navigates to another view of the site.
    fn navigate_view(&self, view: &str);

    /// Leaves the site for `url`.
    fn navigate_external(&self, url: &str);
}
