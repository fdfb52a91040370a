//! `sanctuary` - narrative phase engine for the BAR Sanctuary site
//!
//! A per-visitor state machine (`Normal → Uncanny → Intrusion`) persisted in
//! a session record and driven by two hidden triggers: a rapid logo click
//! burst and typing a secret word. Rendering and navigation are delegated to
//! [`effects::EffectDispatcher`] and [`effects::Navigator`] implementations.

pub mod cli;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod observability;
pub mod phase;
pub mod schedule;
pub mod store;
pub mod trigger;
