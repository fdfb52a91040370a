//! Metrics for `sanctuary`.
//!
//! Counters and gauges are recorded through the `metrics` facade. The crate
//! installs no recorder; an embedding application that installs one gets
//! these series, otherwise recording is a no-op.

use metrics::{counter, gauge};

use crate::phase::Phase;

/// Records a phase transition.
pub fn record_transition(from: Phase, to: Phase) {
    counter!(
        "sanctuary_phase_transitions_total",
        "from" => from.name(),
        "to" => to.name()
    )
    .increment(1);
    set_current_phase(to);
}

/// Records a recognized trigger (`"click_burst"` or `"keystroke"`).
pub fn record_trigger(kind: &'static str) {
    counter!("sanctuary_trigger_matches_total", "kind" => kind).increment(1);
}

/// Records a failed storage operation (`"read"`, `"write"`, `"clear"`).
pub fn record_storage_failure(operation: &'static str) {
    counter!("sanctuary_storage_failures_total", "operation" => operation).increment(1);
}

/// Sets the current-phase gauge.
pub fn set_current_phase(phase: Phase) {
    gauge!("sanctuary_current_phase").set(f64::from(phase.index()));
}
