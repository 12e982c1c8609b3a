//! Revision repository abstraction and in-memory implementation.
//!
//! Repositories are append-only per entity. Pages are newest first by
//! timestamp, ties broken by the higher id.

use std::sync::Mutex;

use crate::errors::{AuditError, ExError, ExErrorKind};
use crate::model::{NewRevision, PagedResult, RevisionQuery, RevisionRecord};

/// Storage seam for revision records
///
/// Implemented by [`MemoryRevisionStore`] here and by the SQLite repository in
/// `revtrail-store`.
pub trait RevisionRepository {
    /// Persist a revision and return it with its assigned id
    ///
    /// # Errors
    ///
    /// `Persistence` when the backend rejects the write.
    fn append(&self, revision: NewRevision) -> Result<RevisionRecord, ExError>;

    /// Fetch one page of an entity's revisions
    ///
    /// # Errors
    ///
    /// `InvalidInput` for out-of-range paging arguments; `Persistence` on
    /// backend failure.
    fn page(&self, query: &RevisionQuery) -> Result<PagedResult<RevisionRecord>, ExError>;

    /// Look up a revision by id
    ///
    /// # Errors
    ///
    /// `Persistence` on backend failure.
    fn get(&self, revision_id: i64) -> Result<Option<RevisionRecord>, ExError>;

    /// Remove a revision; `true` iff a record was removed
    ///
    /// # Errors
    ///
    /// `Persistence` on backend failure.
    fn delete(&self, revision_id: i64) -> Result<bool, ExError>;
}

/// Case-insensitive substring test used by every repository's search
///
/// Folds with Unicode lowercase so "CÔNG TY" matches "công ty".
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether a record matches a trimmed, non-empty search text
pub fn record_matches(record: &RevisionRecord, search: &str) -> bool {
    contains_ignore_case(&record.before_snapshot, search)
        || contains_ignore_case(&record.after_snapshot, search)
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<RevisionRecord>,
    last_id: i64,
}

/// Mutex-guarded in-memory repository
#[derive(Debug, Default)]
pub struct MemoryRevisionStore {
    state: Mutex<MemoryState>,
}

impl MemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all entities
    ///
    /// # Errors
    ///
    /// `Internal` when the store lock is poisoned.
    pub fn len(&self) -> Result<usize, ExError> {
        Ok(self.lock("len")?.records.len())
    }

    /// # Errors
    ///
    /// `Internal` when the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, ExError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self, op: &str) -> Result<std::sync::MutexGuard<'_, MemoryState>, ExError> {
        self.state.lock().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op(op)
                .with_message("memory revision store lock poisoned")
        })
    }
}

impl RevisionRepository for MemoryRevisionStore {
    fn append(&self, revision: NewRevision) -> Result<RevisionRecord, ExError> {
        if revision.entity_id.trim().is_empty() {
            return Err(ExError::from(AuditError::EmptyEntityId).with_op("append_revision"));
        }
        let mut state = self.lock("append_revision")?;
        state.last_id += 1;
        let record = revision.into_record(state.last_id);
        state.records.push(record.clone());
        Ok(record)
    }

    fn page(&self, query: &RevisionQuery) -> Result<PagedResult<RevisionRecord>, ExError> {
        query
            .validate()
            .map_err(|e| ExError::from(e).with_op("page_revisions"))?;
        let search = query.search_text();

        let state = self.lock("page_revisions")?;
        let mut matching: Vec<&RevisionRecord> = state
            .records
            .iter()
            .filter(|r| r.entity_id == query.entity_id)
            .filter(|r| search.map_or(true, |s| record_matches(r, s)))
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let total_count = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(PagedResult::new(
            items,
            total_count,
            query.page_number,
            query.page_size,
        ))
    }

    fn get(&self, revision_id: i64) -> Result<Option<RevisionRecord>, ExError> {
        let state = self.lock("get_revision")?;
        Ok(state.records.iter().find(|r| r.id == revision_id).cloned())
    }

    fn delete(&self, revision_id: i64) -> Result<bool, ExError> {
        let mut state = self.lock("delete_revision")?;
        let before = state.records.len();
        state.records.retain(|r| r.id != revision_id);
        Ok(state.records.len() < before)
    }
}
