//! Observability module
//!
//! Logging, metrics, and the structured JSONL event stream used to trace
//! played sessions.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
