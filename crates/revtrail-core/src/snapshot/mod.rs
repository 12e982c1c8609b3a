//! Snapshot canonicalization and digests.
//!
//! ## Determinism Guarantees
//!
//! - Same logical entity state → byte-identical canonical text
//! - Object keys are emitted in sorted order, compact JSON
//! - Transient fields and back-references never reach the text

pub mod canonical;
pub mod digest;

pub use canonical::{canonicalize, canonicalize_value, CanonicalOptions, DEFAULT_NESTING_CAP};
pub use digest::snapshot_digest;
