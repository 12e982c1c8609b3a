//! revtrail Engine - Orchestration layer
//!
//! Provides the operations collaborators call around a committed mutation
//! (capture) and when rendering an entity's history (page fetch, grouped
//! diff view), coordinating core diff logic with the SQLite ledger.

pub mod commands;
