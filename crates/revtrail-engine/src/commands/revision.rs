//! Revision write path and raw page fetch.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use revtrail_core::errors::ExError;
use revtrail_core::{
    log_op_end, log_op_error, log_op_start, CaptureGuard, PagedResult, RevisionQuery,
    RevisionRecord, RevisionRepository,
};
use revtrail_store::errors::Result;
use revtrail_store::SqliteRevisionRepository;
use rusqlite::Connection;
use serde_json::Value;

/// Record a committed mutation, best-effort
///
/// Returns the stored record, or `None` when the states are equal or the
/// write failed. Failures are logged, never returned; callers may ignore the
/// result.
pub fn capture_mutation(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
    before: &Value,
    after: &Value,
) -> Option<RevisionRecord> {
    capture_mutation_at(conn, entity_type, entity_id, before, after, Utc::now())
}

/// [`capture_mutation`] with an explicit timestamp (imports, replays)
pub fn capture_mutation_at(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
    before: &Value,
    after: &Value,
    timestamp: DateTime<Utc>,
) -> Option<RevisionRecord> {
    let repo = match SqliteRevisionRepository::new(conn) {
        Ok(repo) => repo,
        Err(e) => {
            log_op_error!(
                "capture_revision",
                e.with_entity_id(entity_id),
                duration_ms = 0u64,
                entity_id = entity_id
            );
            return None;
        }
    };
    CaptureGuard::new(&repo).capture_values_at(entity_type, entity_id, before, after, timestamp)
}

/// Fetch one page of an entity's raw revisions, newest first
///
/// # Errors
///
/// `InvalidInput` for bad paging arguments; `Persistence` when the ledger
/// cannot be read.
pub fn fetch_revisions(
    conn: &Connection,
    entity_id: &str,
    page_number: u32,
    page_size: u32,
    search: Option<&str>,
) -> Result<PagedResult<RevisionRecord>> {
    log_op_start!("fetch_revisions", entity_id = entity_id);
    let start = std::time::Instant::now();

    let result = (|| -> Result<PagedResult<RevisionRecord>> {
        let repo = SqliteRevisionRepository::new(conn)?;
        let query = RevisionQuery::new(entity_id, page_number, page_size)
            .with_search(search.map(str::to_string));
        repo.page(&query)
    })();

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(page) => log_op_end!(
            "fetch_revisions",
            duration_ms = elapsed,
            record_count = page.items.len() as u64
        ),
        Err(e) => {
            let e_clone: ExError = e.clone();
            log_op_error!("fetch_revisions", e_clone, duration_ms = elapsed);
        }
    }
    result
}

/// Administrative delete of one revision
///
/// Returns `true` iff a record was removed.
///
/// # Errors
///
/// `Persistence` when the ledger cannot be written.
pub fn delete_revision(conn: &Connection, revision_id: i64) -> Result<bool> {
    log_op_start!("delete_revision", revision_id = revision_id);
    let start = std::time::Instant::now();

    let result = SqliteRevisionRepository::new(conn).and_then(|repo| repo.delete(revision_id));

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(removed) => log_op_end!("delete_revision", duration_ms = elapsed, removed = *removed),
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!("delete_revision", e_clone, duration_ms = elapsed);
        }
    }
    result
}
