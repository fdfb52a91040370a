//! Rolling keystroke buffer matched against the secret word
//!
//! The buffer grows until it holds more than `buffer_cap` characters, then
//! drops everything but the last `truncate_to`. This is coarser than a
//! sliding window of the word's length, and the match check runs on the
//! truncated buffer.

use tracing::trace;

use crate::config::KeyConfig;

use super::TriggerResult;

/// In-memory keystroke buffer. Not persisted: a reload starts empty.
#[derive(Debug, Clone)]
pub struct KeystrokeBuffer {
    buffer: Vec<char>,
    word: Vec<char>,
    buffer_cap: usize,
    truncate_to: usize,
}

impl KeystrokeBuffer {
    /// Creates an empty buffer for `word`.
    pub fn new(word: &str, buffer_cap: usize, truncate_to: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(buffer_cap + 1),
            word: word.chars().collect(),
            buffer_cap,
            truncate_to,
        }
    }

    /// Creates an empty buffer from configuration.
    #[must_use]
    pub fn from_config(config: &KeyConfig) -> Self {
        Self::new(&config.secret_word, config.buffer_cap, config.truncate_to)
    }

    /// Returns whether `c` belongs to the secret word's alphabet.
    #[must_use]
    pub fn accepts(&self, c: char) -> bool {
        self.word.iter().any(|&w| same_letter(w, c))
    }

    /// Feeds one character.
    ///
    /// Returns `None` when `c` is outside the alphabet (nothing observed),
    /// otherwise the match result. A match clears the buffer.
    pub fn push(&mut self, c: char) -> Option<TriggerResult> {
        if !self.accepts(c) {
            return None;
        }

        self.buffer.push(c);
        if self.buffer.len() > self.buffer_cap {
            let excess = self.buffer.len() - self.truncate_to.min(self.buffer.len());
            self.buffer.drain(..excess);
        }
        trace!(buffer = %self.contents(), "keystroke buffered");

        if self.tail_matches() {
            self.buffer.clear();
            let word: String = self.word.iter().collect();
            return Some(TriggerResult::Fired(format!("typed '{word}'")));
        }
        Some(TriggerResult::NotMet)
    }

    /// Returns the buffered characters.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.iter().collect()
    }

    /// Returns the number of buffered characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn tail_matches(&self) -> bool {
        let Some(start) = self.buffer.len().checked_sub(self.word.len()) else {
            return false;
        };
        !self.word.is_empty()
            && self.buffer[start..]
                .iter()
                .zip(&self.word)
                .all(|(&a, &b)| same_letter(a, b))
    }
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
