pub mod entities;
pub mod revision;

pub use entities::{transient_fields_for, Address, Auditable, Contract, Order, Reseller};
pub use revision::{NewRevision, PagedResult, RevisionQuery, RevisionRecord, MAX_PAGE_SIZE};
