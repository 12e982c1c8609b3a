//! revtrail Store - SQLite persistence for the revision ledger
//!
//! Provides:
//! - Connection helpers (WAL, foreign keys, search function registration)
//! - Embedded SQL migrations with checksums
//! - `SqliteRevisionRepository`, the SQLite `RevisionRepository`

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::SqliteRevisionRepository;
