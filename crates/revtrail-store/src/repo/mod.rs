//! Repository layer for the revision ledger

pub mod revision_repo;

pub use revision_repo::SqliteRevisionRepository;
