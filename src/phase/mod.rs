//! Phase engine
//!
//! The narrative state machine: `Normal → Uncanny → Intrusion`, strictly
//! forward, one step at a time.
//!
//! # Architecture
//!
//! - [`Phase`]: the persisted phase value
//! - [`table`]: which effects each phase runs on entry and on every load
//! - [`Site`]: shared configuration, storage and collaborators
//! - [`PhaseEngine`]: one page view: input handling, transitions, timers

pub mod engine;
pub mod state;
pub mod table;

pub use engine::{Input, PageView, PhaseEngine, Site};
pub use state::{Phase, PhaseTransition};
pub use table::{AmbientEffect, EffectPolicy, EntryEffect, PhaseEffects};
