//! Loanstats Server - process wiring and CLI commands
//!
//! This crate provides the `loanstats` binary and command orchestration.

pub mod commands;
pub mod context;

pub use context::AppContext;
