//! Revision diff engine.
//!
//! Replays stored before/after snapshot pairs into labelled, noise-free change
//! lists.
//!
//! ## Entry point
//!
//! ```
//! use revtrail_core::config::DiffConfig;
//! use revtrail_core::diff::diff_snapshots;
//!
//! let config = DiffConfig::default();
//! let items = diff_snapshots(
//!     r#"{"companyName":"Cong Ty Cu"}"#,
//!     r#"{"companyName":"Cong Ty Moi"}"#,
//!     "contract",
//!     &config,
//! );
//! assert_eq!(items[0].path, "companyName");
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: the same record and config always produce the same items,
//!   ordered by path.
//! - **Noise suppression**: identities, child collections and credentials never
//!   appear as changes.
//! - **Representation tolerance**: date granularity, integral floats, blank
//!   versus absent values and re-signed URLs do not register.
//! - **Never fails**: malformed snapshots degrade to one opaque item.

pub mod engine;
pub mod flatten;
pub mod format;
pub mod labels;
pub mod model;
pub mod noise;
pub mod normalize;

pub use engine::{build_group, build_groups, diff_snapshots, filter_groups};
pub use format::{format_value, DisplayValue, FormatOptions};
pub use labels::{humanize, resolve_label, LabelDictionary, LabelText};
pub use model::{ChangeItem, ChangeKind, RevisionGroup};
pub use noise::NoisePolicy;
