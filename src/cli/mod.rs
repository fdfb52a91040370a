//! Command-line interface
//!
//! Argument parsing, the session script format and command handlers.

pub mod args;
pub mod commands;
pub mod script;
