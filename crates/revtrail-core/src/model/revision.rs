use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AuditError, Result};

/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 500;

/// Persisted revision of one entity
///
/// Records are immutable once written. `id` is assigned by the store and
/// increases with insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRecord {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub before_snapshot: String,
    pub after_snapshot: String,
    pub timestamp: DateTime<Utc>,
}

/// A revision that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRevision {
    pub entity_type: String,
    pub entity_id: String,
    pub before_snapshot: String,
    pub after_snapshot: String,
    pub timestamp: DateTime<Utc>,
}

impl NewRevision {
    /// Build a revision; the timestamp is truncated to whole milliseconds,
    /// the resolution stores keep.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        before_snapshot: impl Into<String>,
        after_snapshot: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            before_snapshot: before_snapshot.into(),
            after_snapshot: after_snapshot.into(),
            timestamp: truncate_to_millis(timestamp),
        }
    }

    pub fn into_record(self, id: i64) -> RevisionRecord {
        RevisionRecord {
            id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            before_snapshot: self.before_snapshot,
            after_snapshot: self.after_snapshot,
            timestamp: self.timestamp,
        }
    }
}

/// Convert a stored millisecond timestamp back into a UTC instant
pub fn timestamp_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    timestamp_from_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Page request over one entity's revisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionQuery {
    pub entity_id: String,
    /// 1-based
    pub page_number: u32,
    pub page_size: u32,
    pub search: Option<String>,
}

impl RevisionQuery {
    pub fn new(entity_id: impl Into<String>, page_number: u32, page_size: u32) -> Self {
        Self {
            entity_id: entity_id.into(),
            page_number,
            page_size,
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }

    /// Check paging bounds and the entity id
    ///
    /// # Errors
    ///
    /// `InvalidPage` when `page_number` is 0 or `page_size` is outside
    /// `1..=MAX_PAGE_SIZE`; `EmptyEntityId` for a blank entity id.
    pub fn validate(&self) -> Result<()> {
        if self.entity_id.trim().is_empty() {
            return Err(AuditError::EmptyEntityId);
        }
        if self.page_number == 0 || self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(AuditError::InvalidPage {
                page_number: self.page_number,
                page_size: self.page_size,
            });
        }
        Ok(())
    }

    /// Trimmed search text; blank means no filter
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Number of matching rows preceding this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of results plus the totals needed to render a pager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, page_number: u32, page_size: u32) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(u64::from(page_size))
        };
        Self {
            items,
            total_count,
            page_number,
            page_size,
            total_pages,
        }
    }

    /// Replace the items, keeping the store counts
    pub fn with_items<U>(self, items: Vec<U>) -> PagedResult<U> {
        PagedResult {
            items,
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
