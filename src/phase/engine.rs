//! Phase engine orchestration
//!
//! A [`PhaseEngine`] lives for exactly one page view. It is created by
//! [`Site::load`], which applies the home reset, logs the view and resumes
//! the current phase's ambient effects. Inputs are handled synchronously in
//! the order they arrive; timed effects run on the engine's [`PageScope`]
//! and stop when the engine is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::{self, NarrativeConfig};
use crate::effects::{AmbientTick, CallToAction, EffectDispatcher, Navigator};
use crate::error::ConfigError;
use crate::observability::metrics;
use crate::schedule::PageScope;
use crate::store::{ActionLog, SessionState, StateStore, StorageBackend};
use crate::trigger::{ClickBurst, KeystrokeBuffer, TriggerResult};

use super::state::{Phase, PhaseTransition};
use super::table::{self, AmbientEffect, EntryEffect};

/// Normalized user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The site logo was activated.
    ClickActivate,
    /// A character was typed.
    CharInput(char),
    /// The finale's call to action was accepted.
    AcceptInvitation,
}

/// The page being loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// Location path, e.g. `/recruit.html`.
    pub path: String,
    /// Document title, used in the action log.
    pub title: String,
}

impl PageView {
    /// Creates a page view.
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }
}

/// Everything shared across page loads of one site: configuration, storage
/// and the rendering collaborators.
#[derive(Clone)]
pub struct Site {
    config: Arc<NarrativeConfig>,
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    effects: Arc<dyn EffectDispatcher>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("storage_key", &self.config.storage_key)
            .finish_non_exhaustive()
    }
}

impl Site {
    /// Creates a site using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `config` fails
    /// [`validate`](crate::config::validate), e.g. a zero ambient interval.
    pub fn new(
        config: NarrativeConfig,
        backend: Arc<dyn StorageBackend>,
        effects: Arc<dyn EffectDispatcher>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConfigError> {
        config::validate(&config)?;
        Ok(Self {
            config: Arc::new(config),
            backend,
            clock: Arc::new(SystemClock),
            effects,
            navigator,
        })
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    /// Opens the session store without loading a page.
    #[must_use]
    pub fn store(&self) -> StateStore {
        StateStore::new(
            Arc::clone(&self.backend),
            self.config.storage_key.clone(),
            Arc::clone(&self.clock),
        )
    }

    /// Loads `page` and returns its engine.
    ///
    /// Home pages clear the session record first. Every load appends a
    /// `VIEW:` entry to the action log, then resumes the ambient effects of
    /// the stored phase. One-shot entry effects are never replayed here.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime while the stored phase has
    /// ambient effects to resume.
    #[must_use]
    pub fn load(&self, page: &PageView) -> PhaseEngine {
        let store = self.store();
        if self.config.is_home(&page.path) {
            info!(path = %page.path, "returned to home; resetting session");
            store.clear();
        }

        let mut engine = PhaseEngine {
            config: Arc::clone(&self.config),
            clicks: ClickBurst::from_config(&self.config.clicks),
            keys: KeystrokeBuffer::from_config(&self.config.keys),
            store,
            effects: Arc::clone(&self.effects),
            navigator: Arc::clone(&self.navigator),
            page: PageScope::new(),
            ambient: None,
            finale_rendered: false,
            cta_ready: Arc::new(AtomicBool::new(false)),
        };
        engine.log(&format!("VIEW: {}", page.title));
        engine.resume();
        engine
    }
}

/// Phase state machine for one page view.
///
/// Owns the keystroke buffer and every task scheduled during the view.
/// Dropping the engine (navigating away) cancels those tasks.
pub struct PhaseEngine {
    config: Arc<NarrativeConfig>,
    store: StateStore,
    clicks: ClickBurst,
    keys: KeystrokeBuffer,
    effects: Arc<dyn EffectDispatcher>,
    navigator: Arc<dyn Navigator>,
    /// Lifetime of this page view.
    page: PageScope,
    /// Ambient loops of the current phase; replaced on every transition.
    ambient: Option<PageScope>,
    /// Whether the finale has been rendered during this page view.
    finale_rendered: bool,
    /// Set once the call to action has been presented.
    cta_ready: Arc<AtomicBool>,
}

impl std::fmt::Debug for PhaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseEngine")
            .field("store", &self.store)
            .field("keys", &self.keys)
            .field("finale_rendered", &self.finale_rendered)
            .finish_non_exhaustive()
    }
}

impl PhaseEngine {
    /// Handles one input event.
    ///
    /// Returns `Some(PhaseTransition)` if the input advanced the phase.
    pub fn handle(&mut self, input: Input) -> Option<PhaseTransition> {
        match input {
            Input::ClickActivate => self.click(),
            Input::CharInput(c) => self.key(c),
            Input::AcceptInvitation => {
                self.accept();
                None
            }
        }
    }

    /// Returns the persisted phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.store.get().phase
    }

    /// Returns a snapshot of the session record.
    #[must_use]
    pub fn session(&self) -> SessionState {
        self.store.get()
    }

    /// Returns the keystroke buffer.
    #[must_use]
    pub const fn keystrokes(&self) -> &KeystrokeBuffer {
        &self.keys
    }

    /// Returns whether ambient loops are running.
    #[must_use]
    pub fn ambient_running(&self) -> bool {
        self.ambient.as_ref().is_some_and(|scope| !scope.is_closed())
    }

    /// Returns whether the finale's call to action is on screen.
    #[must_use]
    pub fn invitation_shown(&self) -> bool {
        self.cta_ready.load(Ordering::SeqCst)
    }

    /// Stops every scheduled task of this page view.
    pub fn stop_all(&mut self) {
        self.stop_ambient();
        self.page.close();
    }

    fn click(&mut self) -> Option<PhaseTransition> {
        let now = self.store.clock().now();
        let clicks = &self.clicks;
        let outcome = self.store.update(|s| {
            let outcome = clicks.register(s, now);
            if outcome.trigger.fired() {
                s.phase = Phase::Uncanny;
            }
            outcome
        });
        debug!(count = outcome.count, "logo click");

        if let Some(intensity) = outcome.intensity {
            self.effects.on_click_feedback(intensity);
        }

        match outcome.trigger {
            TriggerResult::Fired(reason) => {
                metrics::record_trigger("click_burst");
                Some(self.enter(Phase::Normal, Phase::Uncanny, reason))
            }
            TriggerResult::NotMet => None,
        }
    }

    fn key(&mut self, c: char) -> Option<PhaseTransition> {
        let result = self.keys.push(c)?;
        self.effects.on_key_echo(c);

        let TriggerResult::Fired(reason) = result else {
            return None;
        };
        metrics::record_trigger("keystroke");
        self.wake(reason)
    }

    fn wake(&mut self, reason: String) -> Option<PhaseTransition> {
        let from = self.store.update(|s| {
            let from = s.phase;
            if from >= Phase::Uncanny {
                s.phase = Phase::Intrusion;
            }
            from
        });

        match from {
            Phase::Normal => {
                debug!("wake attempt before uncanny; ignoring");
                None
            }
            Phase::Uncanny => Some(self.enter(Phase::Uncanny, Phase::Intrusion, reason)),
            Phase::Intrusion => {
                if self.finale_rendered {
                    debug!("finale already rendered on this page; ignoring");
                } else {
                    info!("re-entering finale on this page view");
                    self.stop_ambient();
                    self.run_entry(Phase::Intrusion);
                }
                None
            }
        }
    }

    fn accept(&self) {
        if !self.invitation_shown() {
            debug!("call to action not shown yet; ignoring");
            return;
        }
        let url = &self.config.finale.cta_url;
        info!(url = %url, "leaving for the call to action");
        self.log(&format!("EXIT: {url}"));
        self.navigator.navigate_external(url);
    }

    /// Applies a transition that the store already recorded.
    fn enter(&mut self, from: Phase, to: Phase, reason: String) -> PhaseTransition {
        info!(from = %from, to = %to, reason = %reason, "phase transition");
        metrics::record_transition(from, to);
        self.log(&format!("PHASE: {} -> {}", from.index(), to.index()));

        self.stop_ambient();
        self.run_entry(to);
        self.start_ambient(table::effects(to).entered);

        PhaseTransition { from, to, reason }
    }

    fn resume(&mut self) {
        let phase = self.phase();
        metrics::set_current_phase(phase);
        let effects = table::effects(phase);
        if !effects.is_resumable() {
            return;
        }
        debug!(phase = %phase, "resuming ambient effects");
        self.effects.on_ambient_resume(phase);
        self.start_ambient(effects.resumed);
    }

    fn run_entry(&mut self, phase: Phase) {
        self.effects.on_phase_enter(phase);
        for effect in table::effects(phase).entry {
            match effect {
                EntryEffect::GlitchRedirect => {
                    let navigator = Arc::clone(&self.navigator);
                    let view = self.config.glitch.view.clone();
                    self.page
                        .spawn_after(self.config.glitch.redirect_delay, move || {
                            navigator.navigate_view(&view);
                        });
                }
                EntryEffect::Finale => self.start_finale(),
            }
        }
    }

    fn start_finale(&mut self) {
        self.finale_rendered = true;
        self.cta_ready.store(false, Ordering::SeqCst);

        let finale = &self.config.finale;
        let message = finale.message.clone();
        let cadence = finale.reveal_cadence;
        let cta_delay = finale.cta_delay;
        let cta = CallToAction {
            label: finale.cta_label.clone(),
            url: finale.cta_url.clone(),
        };
        let effects = Arc::clone(&self.effects);
        let ready = Arc::clone(&self.cta_ready);

        self.page.spawn(async move {
            let mut revealed = String::with_capacity(message.len());
            for c in message.chars() {
                revealed.push(c);
                effects.on_reveal(&revealed);
                tokio::time::sleep(cadence).await;
            }
            tokio::time::sleep(cta_delay).await;
            ready.store(true, Ordering::SeqCst);
            effects.on_finale_complete(&cta);
        });
    }

    fn start_ambient(&mut self, ambient: &'static [AmbientEffect]) {
        if ambient.is_empty() {
            return;
        }

        let scope = self.page.child();
        let glitch = &self.config.glitch;
        for effect in ambient {
            let effects = Arc::clone(&self.effects);
            match effect {
                AmbientEffect::Flash => {
                    scope.spawn_repeating(glitch.flash_interval, move || {
                        effects.on_ambient_tick(AmbientTick::Flash);
                    });
                }
                AmbientEffect::TextGlitch => {
                    scope.spawn_repeating(glitch.text_interval, move || {
                        effects.on_ambient_tick(AmbientTick::TextGlitch);
                    });
                }
                AmbientEffect::WakeHints => {
                    let words = glitch.hint_words.clone();
                    scope.spawn_repeating(glitch.hint_interval, move || {
                        if let Some(word) = words.choose(&mut rand::rng()) {
                            effects.on_ambient_tick(AmbientTick::Hint(word.clone()));
                        }
                    });
                }
            }
        }
        self.ambient = Some(scope);
    }

    fn stop_ambient(&mut self) {
        if let Some(scope) = self.ambient.take() {
            scope.close();
        }
    }

    fn log(&self, message: &str) {
        ActionLog::new(&self.store, self.config.action_log_capacity).log(message);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::clock::ManualClock;
    use crate::effects::{Call, Recorder};
    use crate::store::MemoryBackend;

    struct Harness {
        site: Site,
        backend: MemoryBackend,
        clock: Arc<ManualClock>,
        rec: Recorder,
    }

    fn harness() -> Harness {
        let backend = MemoryBackend::new();
        let rec = Recorder::new();
        let clock = Arc::new(ManualClock::new(
            DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap(),
        ));
        let site = Site::new(
            NarrativeConfig::default(),
            Arc::new(backend.clone()),
            Arc::new(rec.clone()),
            Arc::new(rec.clone()),
        )
        .unwrap()
        .with_clock(clock.clone());
        Harness {
            site,
            backend,
            clock,
            rec,
        }
    }

    fn recruit() -> PageView {
        PageView::new("/recruit.html", "Recruit")
    }

    fn burst(h: &Harness, engine: &mut PhaseEngine, n: usize) -> Vec<PhaseTransition> {
        (0..n)
            .filter_map(|_| {
                h.clock.advance(Duration::from_millis(200));
                engine.handle(Input::ClickActivate)
            })
            .collect()
    }

    fn type_word(engine: &mut PhaseEngine, word: &str) -> Vec<PhaseTransition> {
        word.chars()
            .filter_map(|c| engine.handle(Input::CharInput(c)))
            .collect()
    }

    #[test]
    fn site_rejects_zero_ambient_interval() {
        let mut config = NarrativeConfig::default();
        config.glitch.flash_interval = Duration::ZERO;
        let rec = Recorder::new();
        let err = Site::new(
            config,
            Arc::new(MemoryBackend::new()),
            Arc::new(rec.clone()),
            Arc::new(rec),
        )
        .unwrap_err();
        let ConfigError::InvalidValue { field, .. } = err else {
            panic!("expected InvalidValue, got {err:?}");
        };
        assert_eq!(field, "glitch.flash_interval");
    }

    #[tokio::test(start_paused = true)]
    async fn seven_clicks_enter_uncanny_once() {
        let h = harness();
        let mut engine = h.site.load(&recruit());

        let transitions = burst(&h, &mut engine, 10);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from, Phase::Normal);
        assert_eq!(transitions[0].to, Phase::Uncanny);
        assert_eq!(engine.phase(), Phase::Uncanny);
        assert_eq!(h.rec.count(|c| *c == Call::PhaseEnter(Phase::Uncanny)), 1);
        assert_eq!(
            h.rec.filter(|c| matches!(c, Call::ClickFeedback(_))),
            vec![
                Call::ClickFeedback(1),
                Call::ClickFeedback(2),
                Call::ClickFeedback(3),
                Call::ClickFeedback(4),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn glitch_redirect_after_delay() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);

        tokio::time::sleep(Duration::from_millis(990)).await;
        assert_eq!(h.rec.count(|c| matches!(c, Call::NavigateView(_))), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            h.rec.filter(|c| matches!(c, Call::NavigateView(_))),
            vec![Call::NavigateView("glitch.html".into())]
        );
        assert!(engine.ambient_running());
    }

    #[tokio::test(start_paused = true)]
    async fn redirect_cancelled_when_page_unloads() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);
        drop(engine);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.rec.count(|c| matches!(c, Call::NavigateView(_))), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_clicks_stay_normal() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        for _ in 0..10 {
            h.clock.advance(Duration::from_millis(1600));
            assert!(engine.handle(Input::ClickActivate).is_none());
        }
        assert_eq!(engine.phase(), Phase::Normal);
        assert_eq!(engine.session().logo_clicks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn wake_ignored_in_normal() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        assert!(type_word(&mut engine, "WAKE").is_empty());
        assert_eq!(engine.phase(), Phase::Normal);
        assert_eq!(h.rec.count(|c| matches!(c, Call::KeyEcho(_))), 4);
        assert!(engine.keystrokes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn wake_in_uncanny_enters_intrusion_once() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);

        let transitions = type_word(&mut engine, "WAKE");
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].to, Phase::Intrusion);
        assert!(engine.keystrokes().is_empty());
        assert!(!engine.ambient_running());

        assert!(type_word(&mut engine, "WAKE").is_empty());
        assert_eq!(h.rec.count(|c| *c == Call::PhaseEnter(Phase::Intrusion)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finale_reveals_then_offers_invitation() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);
        type_word(&mut engine, "wake");

        engine.handle(Input::AcceptInvitation);
        assert_eq!(h.rec.count(|c| matches!(c, Call::NavigateExternal(_))), 0);

        let message = &h.site.config().finale.message;
        let chars = u64::try_from(message.chars().count()).unwrap();
        tokio::time::sleep(Duration::from_millis(40 * chars + 1100)).await;

        let reveals = h.rec.filter(|c| matches!(c, Call::Reveal(_)));
        assert_eq!(reveals.len(), message.chars().count());
        assert_eq!(reveals.last(), Some(&Call::Reveal(message.clone())));
        assert!(engine.invitation_shown());
        assert_eq!(h.rec.count(|c| matches!(c, Call::FinaleComplete(_))), 1);

        engine.handle(Input::AcceptInvitation);
        assert_eq!(
            h.rec.filter(|c| matches!(c, Call::NavigateExternal(_))),
            vec![Call::NavigateExternal(h.site.config().finale.cta_url.clone())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reload_in_uncanny_resumes_without_redirect() {
        let h = harness();
        {
            let mut engine = h.site.load(&recruit());
            burst(&h, &mut engine, 7);
        }
        h.rec.clear();

        let engine = h.site.load(&PageView::new("/glitch.html", "???"));
        assert_eq!(engine.phase(), Phase::Uncanny);
        assert_eq!(h.rec.calls()[0], Call::AmbientResume(Phase::Uncanny));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.rec.count(|c| matches!(c, Call::NavigateView(_))), 0);
        assert_eq!(h.rec.count(|c| matches!(c, Call::PhaseEnter(_))), 0);
        assert!(h.rec.count(|c| *c == Call::Tick(AmbientTick::Flash)) >= 10);
        assert!(h.rec.count(|c| *c == Call::Tick(AmbientTick::TextGlitch)) >= 3);
        assert!(h.rec.count(|c| matches!(c, Call::Tick(AmbientTick::Hint(_)))) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_in_intrusion_does_not_replay_finale() {
        let h = harness();
        {
            let mut engine = h.site.load(&recruit());
            burst(&h, &mut engine, 7);
            type_word(&mut engine, "WAKE");
        }
        h.rec.clear();

        let mut engine = h.site.load(&recruit());
        assert_eq!(h.rec.calls()[0], Call::AmbientResume(Phase::Intrusion));
        assert!(engine.ambient_running());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(h.rec.count(|c| matches!(c, Call::PhaseEnter(_))), 0);
        assert_eq!(h.rec.count(|c| matches!(c, Call::Reveal(_))), 0);
        assert_eq!(h.rec.count(|c| matches!(c, Call::NavigateView(_))), 0);
        assert!(h.rec.count(|c| *c == Call::Tick(AmbientTick::Flash)) >= 10);
        assert!(h.rec.count(|c| matches!(c, Call::Tick(AmbientTick::Hint(_)))) >= 2);

        // A fresh wake attempt re-renders the finale once on this page and
        // clears the glitch look again.
        assert!(type_word(&mut engine, "WAKE").is_empty());
        assert_eq!(h.rec.count(|c| *c == Call::PhaseEnter(Phase::Intrusion)), 1);
        assert!(!engine.ambient_running());
        type_word(&mut engine, "WAKE");
        assert_eq!(h.rec.count(|c| *c == Call::PhaseEnter(Phase::Intrusion)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn glitch_event_flashes_without_hints() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(h.rec.count(|c| *c == Call::Tick(AmbientTick::Flash)) >= 5);
        assert_eq!(h.rec.count(|c| *c == Call::Tick(AmbientTick::TextGlitch)), 0);
        assert_eq!(h.rec.count(|c| matches!(c, Call::Tick(AmbientTick::Hint(_)))), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn home_visit_resets_session() {
        let h = harness();
        {
            let mut engine = h.site.load(&recruit());
            burst(&h, &mut engine, 7);
            type_word(&mut engine, "WAKE");
        }

        let engine = h.site.load(&PageView::new("/index.html", "BAR Sanctuary"));
        let session = engine.session();
        assert_eq!(session.phase, Phase::Normal);
        assert_eq!(session.logo_clicks, 0);
        assert_eq!(session.actions.len(), 1);
        assert!(session.actions[0].ends_with("VIEW: BAR Sanctuary"));
    }

    #[tokio::test(start_paused = true)]
    async fn action_log_records_views_and_transitions() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);
        let actions = engine.session().actions;
        assert!(actions[0].ends_with("VIEW: Recruit"));
        assert!(actions[1].ends_with("PHASE: 0 -> 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn storage_failure_never_blocks_progress() {
        let h = harness();
        h.backend.set_unavailable(true);
        let mut engine = h.site.load(&recruit());
        assert_eq!(burst(&h, &mut engine, 7).len(), 1);
        assert_eq!(type_word(&mut engine, "WAKE").len(), 1);
        assert_eq!(engine.phase(), Phase::Intrusion);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_silences_page() {
        let h = harness();
        let mut engine = h.site.load(&recruit());
        burst(&h, &mut engine, 7);
        engine.stop_all();
        h.rec.clear();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(h.rec.calls().is_empty());
    }
}
