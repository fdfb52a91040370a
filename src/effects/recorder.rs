//! In-memory effect recorder
//!
//! Implements both [`EffectDispatcher`] and [`Navigator`] by appending every
//! call to a shared log. Useful for headless embedding and for tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::phase::Phase;

use super::{AmbientTick, CallToAction, EffectDispatcher, Navigator};

/// A recorded effect or navigation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `on_phase_enter`
    PhaseEnter(Phase),
    /// `on_ambient_resume`
    AmbientResume(Phase),
    /// `on_ambient_tick`
    Tick(AmbientTick),
    /// `on_click_feedback`
    ClickFeedback(u32),
    /// `on_key_echo`
    KeyEcho(char),
    /// `on_reveal`
    Reveal(String),
    /// `on_finale_complete`
    FinaleComplete(CallToAction),
    /// `navigate_view`
    NavigateView(String),
    /// `navigate_external`
    NavigateExternal(String),
}

/// Cloneable call log; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Returns the calls matching `pred`.
    #[must_use]
    pub fn filter(&self, pred: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.lock().iter().filter(|c| pred(c)).cloned().collect()
    }

    /// Counts the calls matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }

    /// Drops every recorded call.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, call: Call) {
        self.lock().push(call);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EffectDispatcher for Recorder {
    fn on_phase_enter(&self, phase: Phase) {
        self.push(Call::PhaseEnter(phase));
    }

    fn on_ambient_resume(&self, phase: Phase) {
        self.push(Call::AmbientResume(phase));
    }

    fn on_ambient_tick(&self, tick: AmbientTick) {
        self.push(Call::Tick(tick));
    }

    fn on_click_feedback(&self, intensity: u32) {
        self.push(Call::ClickFeedback(intensity));
    }

    fn on_key_echo(&self, key: char) {
        self.push(Call::KeyEcho(key));
    }

    fn on_reveal(&self, revealed: &str) {
        self.push(Call::Reveal(revealed.to_owned()));
    }

    fn on_finale_complete(&self, cta: &CallToAction) {
        self.push(Call::FinaleComplete(cta.clone()));
    }
}

impl Navigator for Recorder {
    fn navigate_view(&self, view: &str) {
        self.push(Call::NavigateView(view.to_owned()));
    }

    fn navigate_external(&self, url: &str) {
        self.push(Call::NavigateExternal(url.to_owned()));
    }
}
