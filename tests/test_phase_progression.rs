mod common;

use std::sync::Arc;
use std::time::Duration;

use common::TestSite;
use sanctuary::effects::Call;
use sanctuary::phase::{Input, Phase};
use sanctuary::store::{FileBackend, MemoryBackend, StorageBackend};

#[tokio::test(start_paused = true)]
async fn full_journey_reaches_intrusion_and_exits() {
    let t = TestSite::new(Arc::new(MemoryBackend::new()));
    let mut engine = t.open("/recruit.html");

    let transitions = t.clicks(&mut engine, 7);
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].to, Phase::Uncanny);

    let transitions = t.type_text(&mut engine, "wake");
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].from, Phase::Uncanny);
    assert_eq!(transitions[0].to, Phase::Intrusion);
    assert!(!engine.ambient_running());

    // Reveal plus the call-to-action delay.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(engine.invitation_shown());

    engine.handle(Input::AcceptInvitation);
    assert_eq!(t.rec.count(|c| matches!(c, Call::NavigateExternal(_))), 1);
    let session = engine.session();
    assert!(session.actions.back().unwrap().contains("EXIT: https://"));
}

#[tokio::test(start_paused = true)]
async fn click_feedback_builds_before_trigger() {
    let t = TestSite::new(Arc::new(MemoryBackend::new()));
    let mut engine = t.open("/recruit.html");

    t.clicks(&mut engine, 6);
    let intensities: Vec<u32> = t
        .rec
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::ClickFeedback(i) => Some(i),
            _ => None,
        })
        .collect();
    assert_eq!(intensities, vec![1, 2, 3, 4]);
    assert_eq!(engine.phase(), Phase::Normal);
}

#[tokio::test(start_paused = true)]
async fn further_bursts_in_uncanny_do_nothing() {
    let t = TestSite::new(Arc::new(MemoryBackend::new()));
    let mut engine = t.open("/recruit.html");

    assert_eq!(t.clicks(&mut engine, 7).len(), 1);
    assert!(t.clicks(&mut engine, 14).is_empty());
    assert_eq!(t.rec.count(|c| matches!(c, Call::PhaseEnter(Phase::Uncanny))), 1);
}

#[tokio::test(start_paused = true)]
async fn wake_typed_amid_noise_still_triggers() {
    let t = TestSite::new(Arc::new(MemoryBackend::new()));
    let mut engine = t.open("/recruit.html");
    t.clicks(&mut engine, 7);

    // Out-of-alphabet characters are ignored entirely.
    let transitions = t.type_text(&mut engine, "xyzW1A K!E");
    assert_eq!(transitions.len(), 1);
    assert_eq!(engine.phase(), Phase::Intrusion);
}

#[tokio::test(start_paused = true)]
async fn progress_is_shared_between_tabs_on_one_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend: Arc<dyn StorageBackend> = Arc::new(FileBackend::new(dir.path()));

    let first = TestSite::new(Arc::clone(&backend));
    let mut tab_a = first.open("/recruit.html");
    first.clicks(&mut tab_a, 7);

    let second = TestSite::new(Arc::clone(&backend));
    let mut tab_b = second.open("/about.html");
    assert_eq!(tab_b.phase(), Phase::Uncanny);
    assert!(tab_b.ambient_running());

    assert_eq!(second.type_text(&mut tab_b, "WAKE").len(), 1);
    assert_eq!(tab_a.phase(), Phase::Intrusion);
}

#[tokio::test(start_paused = true)]
async fn action_log_never_exceeds_capacity() {
    let t = TestSite::new(Arc::new(MemoryBackend::new()));
    for i in 0..40 {
        let engine = t.open(&format!("/page-{i}.html"));
        assert!(engine.session().actions.len() <= 20);
    }
    let engine = t.open("/last.html");
    let actions = engine.session().actions;
    assert_eq!(actions.len(), 20);
    assert!(actions.back().unwrap().ends_with("VIEW: last.html"));
}
