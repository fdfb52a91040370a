//! Shared integration-test helpers: an in-process site harness and a way to
//! run the `sanctuary` binary.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use sanctuary::clock::ManualClock;
use sanctuary::config::NarrativeConfig;
use sanctuary::effects::Recorder;
use sanctuary::phase::{Input, PageView, PhaseEngine, PhaseTransition, Site};
use sanctuary::store::StorageBackend;

/// Gap between scripted clicks; well inside the burst window.
pub const CLICK_GAP: Duration = Duration::from_millis(200);

/// A site wired to a [`Recorder`] and a [`ManualClock`].
pub struct TestSite {
    pub site: Site,
    pub clock: Arc<ManualClock>,
    pub rec: Recorder,
}

impl TestSite {
    /// Builds a site over `backend` with default configuration.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_config(backend, NarrativeConfig::default())
    }

    /// Builds a site over `backend` with `config`.
    #[allow(clippy::missing_panics_doc)]
    pub fn with_config(backend: Arc<dyn StorageBackend>, config: NarrativeConfig) -> Self {
        let rec = Recorder::new();
        let clock = Arc::new(ManualClock::new(
            DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).expect("valid timestamp"),
        ));
        let site = Site::new(config, backend, Arc::new(rec.clone()), Arc::new(rec.clone()))
            .expect("valid config")
            .with_clock(clock.clone());
        Self { site, clock, rec }
    }

    /// Loads a non-home page.
    pub fn open(&self, path: &str) -> PhaseEngine {
        self.site.load(&PageView::new(path, path.trim_start_matches('/')))
    }

    /// Clicks the logo `n` times, `CLICK_GAP` apart.
    pub fn clicks(&self, engine: &mut PhaseEngine, n: usize) -> Vec<PhaseTransition> {
        (0..n)
            .filter_map(|_| {
                self.clock.advance(CLICK_GAP);
                engine.handle(Input::ClickActivate)
            })
            .collect()
    }

    /// Types `text` one character at a time.
    pub fn type_text(&self, engine: &mut PhaseEngine, text: &str) -> Vec<PhaseTransition> {
        text.chars()
            .filter_map(|c| engine.handle(Input::CharInput(c)))
            .collect()
    }
}

/// Runs the `sanctuary` binary to completion with `args`.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command(args: &[&str]) -> Output {
    spawn_command_with_stdin(args, None)
}

/// Runs the `sanctuary` binary with `args`, feeding `stdin` if given.
#[allow(clippy::missing_panics_doc)]
pub fn spawn_command_with_stdin(args: &[&str], stdin: Option<&str>) -> Output {
    use std::io::Write;

    let bin = env!("CARGO_BIN_EXE_sanctuary");
    let mut child = Command::new(bin)
        .args(args)
        .env_remove("SANCTUARY_STATE_DIR")
        .env_remove("SANCTUARY_CONFIG")
        .env_remove("SANCTUARY_LOG_LEVEL")
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sanctuary");

    if let Some(text) = stdin {
        let mut pipe = child.stdin.take().expect("stdin not captured");
        // The child may exit before reading everything; its status tells.
        let _ = pipe.write_all(text.as_bytes());
    }
    child.wait_with_output().expect("wait for sanctuary")
}

/// Parses every JSONL line of a command's stdout.
#[allow(clippy::missing_panics_doc)]
pub fn events(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect()
}

/// Returns the path as `&str`.
#[allow(clippy::missing_panics_doc)]
pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 path")
}
