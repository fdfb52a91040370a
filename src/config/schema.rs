//! Narrative configuration schema
//!
//! Every field defaults to the constants the site ships with, so an empty
//! YAML document (or no document at all) yields the stock experience.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level narrative configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NarrativeConfig {
    /// Storage key holding the serialized session record.
    pub storage_key: String,

    /// Path suffixes identifying the home entry point. Loading a page whose
    /// path ends with any of these clears the session record.
    pub home_suffixes: Vec<String>,

    /// Maximum number of entries kept in the action log.
    pub action_log_capacity: usize,

    /// Logo click-burst recognizer settings.
    pub clicks: ClickConfig,

    /// Keystroke recognizer settings.
    pub keys: KeyConfig,

    /// Uncanny phase effects.
    pub glitch: GlitchConfig,

    /// Intrusion phase finale.
    pub finale: FinaleConfig,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            storage_key: "bar_sanctuary_state".to_owned(),
            home_suffixes: vec!["index.html".to_owned(), "/".to_owned()],
            action_log_capacity: 20,
            clicks: ClickConfig::default(),
            keys: KeyConfig::default(),
            glitch: GlitchConfig::default(),
            finale: FinaleConfig::default(),
        }
    }
}

impl NarrativeConfig {
    /// Returns whether `path` is the home entry point.
    #[must_use]
    pub fn is_home(&self, path: &str) -> bool {
        self.home_suffixes
            .iter()
            .any(|suffix| path.ends_with(suffix.as_str()))
    }
}

/// Click-burst recognizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClickConfig {
    /// Maximum gap between clicks before the burst count resets.
    #[serde(with = "duration_str")]
    pub window: Duration,

    /// Burst count that advances Normal to Uncanny.
    pub threshold: u32,

    /// First burst count that produces shake feedback.
    pub feedback_from: u32,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(1500),
            threshold: 7,
            feedback_from: 3,
        }
    }
}

/// Keystroke recognizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyConfig {
    /// Word that wakes the reader. Its letters form the accepted alphabet.
    pub secret_word: String,

    /// Buffer length that triggers truncation.
    pub buffer_cap: usize,

    /// Number of trailing characters kept after truncation.
    pub truncate_to: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            secret_word: "WAKE".to_owned(),
            buffer_cap: 10,
            truncate_to: 5,
        }
    }
}

/// Uncanny phase settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlitchConfig {
    /// View the reader is sent to after the glitch event.
    pub view: String,

    /// Delay between the glitch event and the redirect.
    #[serde(with = "duration_str")]
    pub redirect_delay: Duration,

    /// Period of the flash overlay loop.
    #[serde(with = "duration_str")]
    pub flash_interval: Duration,

    /// Period of the variable-text scramble loop.
    #[serde(with = "duration_str")]
    pub text_interval: Duration,

    /// Period of the subliminal hint loop.
    #[serde(with = "duration_str")]
    pub hint_interval: Duration,

    /// Words flashed as subliminal hints.
    pub hint_words: Vec<String>,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            view: "glitch.html".to_owned(),
            redirect_delay: Duration::from_millis(1000),
            flash_interval: Duration::from_millis(150),
            text_interval: Duration::from_millis(800),
            hint_interval: Duration::from_millis(1200),
            hint_words: ["WAKE", "KEY: WAKE", "W", "A", "K", "E", "起きろ"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Intrusion phase finale settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinaleConfig {
    /// Scripted message revealed one character at a time.
    pub message: String,

    /// Delay between revealed characters.
    #[serde(with = "duration_str")]
    pub reveal_cadence: Duration,

    /// Delay between the end of the reveal and the call to action.
    #[serde(with = "duration_str")]
    pub cta_delay: Duration,

    /// Call-to-action label.
    pub cta_label: String,

    /// External destination of the call to action.
    pub cta_url: String,
}

impl Default for FinaleConfig {
    fn default() -> Self {
        Self {
            message: "あなたは夢から覚めました。\nもう遊びに行く時間です。\n\n現実は、ここにあります\nあなたの目の前に広がっています。\n\n...それとも、まだ思い出せませんか？".to_owned(),
            reveal_cadence: Duration::from_millis(40),
            cta_delay: Duration::from_millis(1000),
            cta_label: "今日もあのBARに飲みに行く".to_owned(),
            cta_url: "https://cluster.mu/w/1c331560-bc78-44ad-9e37-98428ba614a4".to_owned(),
        }
    }
}

/// Serde adapter for humantime duration strings (`"1500ms"`, `"1s"`).
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
