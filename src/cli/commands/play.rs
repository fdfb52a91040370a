//! `play`: drive one page view from a script
//!
//! Effects and navigation requests are written to stdout as JSONL events.
//! The engine does not follow its own navigation requests; a script moves
//! between pages with `navigate`.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::cli::args::PlayArgs;
use crate::cli::script::{self, Step};
use crate::effects::{EffectDispatcher, Navigator};
use crate::error::SanctuaryError;
use crate::observability::{Event, EventEmitter};
use crate::phase::{Input, PageView, PhaseEngine, PhaseTransition, Site};
use crate::store::FileBackend;

/// Loads the page, plays the script and lingers.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the script cannot be
/// read or parsed, or the state directory cannot be created.
pub async fn run(args: &PlayArgs) -> Result<(), SanctuaryError> {
    let config = super::load_config(args.session.config.as_deref())?;
    let steps = match &args.script {
        Some(path) => script::parse(&read_script(path)?)?,
        None => Vec::new(),
    };
    std::fs::create_dir_all(&args.session.state_dir)?;

    let emitter = Arc::new(match &args.events {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::stdout(),
    });
    let site = Site::new(
        config,
        Arc::new(FileBackend::new(&args.session.state_dir)),
        Arc::clone(&emitter) as Arc<dyn EffectDispatcher>,
        Arc::clone(&emitter) as Arc<dyn Navigator>,
    )?;

    let mut engine = load_page(&site, &emitter, &PageView::new(&args.page, &args.title));
    for step in steps {
        match step {
            Step::Click => feed(&mut engine, &emitter, Input::ClickActivate, "click"),
            Step::Keys(keys) => {
                for c in keys.chars() {
                    feed(&mut engine, &emitter, Input::CharInput(c), &format!("key:{c}"));
                }
            }
            Step::Accept => feed(&mut engine, &emitter, Input::AcceptInvitation, "accept"),
            Step::Wait(d) => tokio::time::sleep(d).await,
            Step::Navigate { path, title } => {
                engine.stop_all();
                let title = title.unwrap_or_else(|| path.clone());
                engine = load_page(&site, &emitter, &PageView::new(path, title));
            }
            Step::Phase => {
                let phase = engine.phase();
                emitter.emit(Event::PhaseReported {
                    timestamp: Utc::now(),
                    phase: phase.index(),
                    phase_name: phase.name().to_owned(),
                });
            }
        }
    }

    if !args.linger.is_zero() {
        debug!(linger = ?args.linger, "lingering on page");
        tokio::time::sleep(args.linger).await;
    }
    engine.stop_all();
    info!(phase = %engine.phase(), events = emitter.event_count(), "session finished");
    Ok(())
}

fn load_page(site: &Site, emitter: &EventEmitter, page: &PageView) -> PhaseEngine {
    let engine = site.load(page);
    emitter.emit(Event::PageLoaded {
        timestamp: Utc::now(),
        path: page.path.clone(),
        title: page.title.clone(),
        phase: engine.phase().index(),
    });
    engine
}

fn feed(engine: &mut PhaseEngine, emitter: &EventEmitter, input: Input, label: &str) {
    emitter.emit(Event::InputHandled {
        timestamp: Utc::now(),
        input: label.to_owned(),
    });
    if let Some(PhaseTransition { from, to, reason }) = engine.handle(input) {
        emitter.emit(Event::PhaseTransition {
            timestamp: Utc::now(),
            from: from.index(),
            to: to.index(),
            reason,
        });
    }
}

fn read_script(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}
