//! revtrail Core - entity revision audit and diff engine
//!
//! This crate provides the write and read paths of the revision audit:
//! - Snapshot canonicalization (deterministic text for an entity state)
//! - Capture guard (records a revision only when the canonical texts differ)
//! - Revision repository trait with an in-memory implementation
//! - Diff pipeline (flatten, noise filter, normalize, label, summarize)
//! - Localized value formatting for presentation layers
//!
//! Persistence backends live in `revtrail-store`; orchestration lives in
//! `revtrail-engine`.

pub mod capture;
pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod snapshot;
pub mod store;

// Used by the exported logging macros
pub use revtrail_core_types;

// Re-export commonly used types
pub use capture::CaptureGuard;
pub use config::{DiffConfig, Language};
pub use diff::{build_groups, diff_snapshots, filter_groups, format_value};
pub use diff::{ChangeItem, ChangeKind, DisplayValue, RevisionGroup};
pub use errors::{AuditError, ExError, ExErrorKind, Result};
pub use model::{Auditable, NewRevision, PagedResult, RevisionQuery, RevisionRecord};
pub use snapshot::{canonicalize, canonicalize_value, snapshot_digest, CanonicalOptions};
pub use store::{MemoryRevisionStore, RevisionRepository};
