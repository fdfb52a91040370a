//! Configuration module
//!
//! Handles loading and validation of the narrative configuration: storage
//! key, trigger thresholds, effect timings and in-story text.

pub mod loader;
pub mod schema;

pub use loader::{load, load_or_default, validate};
pub use schema::*;
