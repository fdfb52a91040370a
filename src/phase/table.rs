//! Per-phase effect table
//!
//! Entry effects are one-shot: they run at the moment a phase is entered and
//! never again, not even after a reload. Ambient effects are resumable and
//! come in two sets per phase: the loops started by the transition itself,
//! and the loops restarted on every page load while the phase is current.
//!
//! Entering Uncanny only starts the flash loop; text scrambles and hints
//! appear from the next load on. Every load at Uncanny or later resumes the
//! full glitch look, Intrusion included, so the hints that lead back into the
//! finale stay on screen. The finale itself is never resumed.

use super::state::Phase;

/// Whether an effect survives a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPolicy {
    /// Runs once, at the transition.
    OneShot,
    /// Re-activated on every page load while the phase is current.
    Resumable,
}

/// Effects run once when a phase is entered, after
/// [`on_phase_enter`](crate::effects::EffectDispatcher::on_phase_enter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryEffect {
    /// Timed redirect to the glitch view.
    GlitchRedirect,
    /// Message reveal followed by the call to action.
    Finale,
}

/// Long-running effects tied to the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientEffect {
    /// Flash overlay loop.
    Flash,
    /// Variable-text scramble loop.
    TextGlitch,
    /// Subliminal secret-word hints.
    WakeHints,
}

impl EntryEffect {
    /// Entry effects are always one-shot.
    #[must_use]
    pub const fn policy(self) -> EffectPolicy {
        EffectPolicy::OneShot
    }
}

impl AmbientEffect {
    /// Ambient effects are always resumable.
    #[must_use]
    pub const fn policy(self) -> EffectPolicy {
        EffectPolicy::Resumable
    }
}

/// The full glitch look restored on every load from Uncanny on.
const GLITCH_LOOK: &[AmbientEffect] = &[
    AmbientEffect::Flash,
    AmbientEffect::TextGlitch,
    AmbientEffect::WakeHints,
];

/// Effects attached to one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEffects {
    /// Run once on entry, in order.
    pub entry: &'static [EntryEffect],
    /// Started by the transition into the phase.
    pub entered: &'static [AmbientEffect],
    /// Started on every page load while the phase is current.
    pub resumed: &'static [AmbientEffect],
}

impl PhaseEffects {
    /// Returns whether loading a page in this phase has anything to resume.
    #[must_use]
    pub const fn is_resumable(&self) -> bool {
        !self.resumed.is_empty()
    }
}

/// Returns the effects attached to `phase`.
#[must_use]
pub const fn effects(phase: Phase) -> PhaseEffects {
    match phase {
        Phase::Normal => PhaseEffects {
            entry: &[],
            entered: &[],
            resumed: &[],
        },
        Phase::Uncanny => PhaseEffects {
            entry: &[EntryEffect::GlitchRedirect],
            entered: &[AmbientEffect::Flash],
            resumed: GLITCH_LOOK,
        },
        // The finale clears the overlays it lands on.
        Phase::Intrusion => PhaseEffects {
            entry: &[EntryEffect::Finale],
            entered: &[],
            resumed: GLITCH_LOOK,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phase_past_normal_resumes_the_glitch_look() {
        assert!(!effects(Phase::Normal).is_resumable());
        assert_eq!(effects(Phase::Uncanny).resumed, GLITCH_LOOK);
        assert_eq!(effects(Phase::Intrusion).resumed, GLITCH_LOOK);
    }

    #[test]
    fn glitch_event_starts_only_the_flash() {
        assert_eq!(effects(Phase::Uncanny).entered, &[AmbientEffect::Flash]);
        assert!(effects(Phase::Intrusion).entered.is_empty());
    }

    #[test]
    fn redirect_is_one_shot() {
        let uncanny = effects(Phase::Uncanny);
        assert!(uncanny.entry.contains(&EntryEffect::GlitchRedirect));
        assert!(
            uncanny
                .entry
                .iter()
                .all(|e| e.policy() == EffectPolicy::OneShot)
        );
        assert!(
            uncanny
                .resumed
                .iter()
                .chain(uncanny.entered)
                .all(|e| e.policy() == EffectPolicy::Resumable)
        );
    }

    #[test]
    fn finale_is_intrusion_entry() {
        assert_eq!(effects(Phase::Intrusion).entry, &[EntryEffect::Finale]);
    }
}
