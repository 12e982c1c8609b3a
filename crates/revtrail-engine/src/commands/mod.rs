//! Command orchestration layer.
//!
//! Provides high-level functions that coordinate between core audit logic
//! and the persistence layer.

pub mod engine_command;
pub mod engine_query;
pub mod history;
pub mod revision;
