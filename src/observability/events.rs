//! Structured event stream for `sanctuary`.
//!
//! Discrete, typed events describing a played session: page loads, inputs,
//! transitions and every effect or navigation the engine requested. Events
//! are serialized as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number.
//!
//! [`EventEmitter`] implements [`EffectDispatcher`] and [`Navigator`], so it
//! can stand in for a renderer and turn a headless session into a trace.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::effects::{AmbientTick, CallToAction, EffectDispatcher, Navigator};
use crate::phase::Phase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted while playing a session.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A page was loaded.
    PageLoaded {
        /// When the page loaded.
        timestamp: DateTime<Utc>,
        /// Location path.
        path: String,
        /// Document title.
        title: String,
        /// Phase index after the load (and any home reset).
        phase: u8,
    },

    /// An input event was handled.
    InputHandled {
        /// When the input was handled.
        timestamp: DateTime<Utc>,
        /// Input description (`"click"`, `"key:W"`, `"accept"`).
        input: String,
    },

    /// The phase advanced.
    PhaseTransition {
        /// When the transition was applied.
        timestamp: DateTime<Utc>,
        /// Phase index we left.
        from: u8,
        /// Phase index we entered.
        to: u8,
        /// Why the trigger fired.
        reason: String,
    },

    /// A phase's entry effect was requested.
    PhaseEntered {
        /// When the effect was requested.
        timestamp: DateTime<Utc>,
        /// Name of the phase that was entered.
        phase_name: String,
        /// Zero-based index of the phase.
        phase_index: u8,
    },

    /// A phase's ambient look was restored on page load.
    AmbientResumed {
        /// When the effect was requested.
        timestamp: DateTime<Utc>,
        /// Name of the resumed phase.
        phase_name: String,
    },

    /// An ambient loop ticked.
    AmbientTicked {
        /// When the tick happened.
        timestamp: DateTime<Utc>,
        /// What ticked.
        tick: AmbientTick,
    },

    /// Shake feedback for a building click burst.
    ClickFeedback {
        /// When the feedback was requested.
        timestamp: DateTime<Utc>,
        /// Shake strength, starting at 1.
        intensity: u32,
    },

    /// A secret-word letter was echoed.
    KeyEchoed {
        /// When the key was echoed.
        timestamp: DateTime<Utc>,
        /// The typed letter.
        key: char,
    },

    /// One more character of the finale message was revealed.
    MessageRevealed {
        /// When the character appeared.
        timestamp: DateTime<Utc>,
        /// Number of characters visible.
        revealed: usize,
        /// The character just revealed.
        character: char,
    },

    /// The finale finished and the call to action is shown.
    FinaleCompleted {
        /// When the call to action appeared.
        timestamp: DateTime<Utc>,
        /// Button label.
        label: String,
        /// External destination.
        url: String,
    },

    /// The current phase was queried by a script.
    PhaseReported {
        /// When the phase was read.
        timestamp: DateTime<Utc>,
        /// Phase index.
        phase: u8,
        /// Phase name.
        phase_name: String,
    },

    /// Navigation was requested.
    NavigationRequested {
        /// When navigation was requested.
        timestamp: DateTime<Utc>,
        /// View name or URL.
        target: String,
        /// Whether the target leaves the site.
        external: bool,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

/// Wraps an [`Event`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct EventEnvelope {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped event (flattened into the same JSON object).
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as a single JSON line, and flushes the underlying
/// writer. Serialization or I/O failures are silently dropped because the
/// trace must never interrupt the session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug; provide a manual impl.
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that silently discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        if let Ok(mut w) = self.writer.lock() {
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
            let envelope = EventEnvelope {
                sequence: seq,
                event,
            };
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Effect sink
// ---------------------------------------------------------------------------

impl EffectDispatcher for EventEmitter {
    fn on_phase_enter(&self, phase: Phase) {
        self.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            phase_name: phase.name().to_owned(),
            phase_index: phase.index(),
        });
    }

    fn on_ambient_resume(&self, phase: Phase) {
        self.emit(Event::AmbientResumed {
            timestamp: Utc::now(),
            phase_name: phase.name().to_owned(),
        });
    }

    fn on_ambient_tick(&self, tick: AmbientTick) {
        self.emit(Event::AmbientTicked {
            timestamp: Utc::now(),
            tick,
        });
    }

    fn on_click_feedback(&self, intensity: u32) {
        self.emit(Event::ClickFeedback {
            timestamp: Utc::now(),
            intensity,
        });
    }

    fn on_key_echo(&self, key: char) {
        self.emit(Event::KeyEchoed {
            timestamp: Utc::now(),
            key,
        });
    }

    fn on_reveal(&self, revealed: &str) {
        if let Some(character) = revealed.chars().next_back() {
            self.emit(Event::MessageRevealed {
                timestamp: Utc::now(),
                revealed: revealed.chars().count(),
                character,
            });
        }
    }

    fn on_finale_complete(&self, cta: &CallToAction) {
        self.emit(Event::FinaleCompleted {
            timestamp: Utc::now(),
            label: cta.label.clone(),
            url: cta.url.clone(),
        });
    }
}

impl Navigator for EventEmitter {
    fn navigate_view(&self, view: &str) {
        self.emit(Event::NavigationRequested {
            timestamp: Utc::now(),
            target: view.to_owned(),
            external: false,
        });
    }

    fn navigate_external(&self, url: &str) {
        self.emit(Event::NavigationRequested {
            timestamp: Utc::now(),
            target: url.to_owned(),
            external: true,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
