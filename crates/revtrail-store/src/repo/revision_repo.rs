//! SQLite revision repository
//!
//! Persists revision records in the `revisions` table created by migration
//! `001_revision_ledger`.

#![allow(clippy::result_large_err)]

use crate::db::register_functions;
use crate::errors::{corrupt_row, from_rusqlite, Result};
use revtrail_core::errors::{AuditError, ExError};
use revtrail_core::model::revision::timestamp_from_millis;
use revtrail_core::{NewRevision, PagedResult, RevisionQuery, RevisionRecord, RevisionRepository};
use rusqlite::{Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str =
    "SELECT id, entity_type, entity_id, before_snapshot, after_snapshot, created_at FROM revisions";

/// Search predicate; `?2` is NULL when there is no search text
const MATCHES_SEARCH: &str = "(?2 IS NULL
    OR revtrail_icontains(before_snapshot, ?2)
    OR revtrail_icontains(after_snapshot, ?2))";

/// A raw row from the `revisions` table
#[derive(Debug, Clone)]
struct RevisionRow {
    id: i64,
    entity_type: String,
    entity_id: String,
    before_snapshot: String,
    after_snapshot: String,
    /// Unix milliseconds
    created_at: i64,
}

impl RevisionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            before_snapshot: row.get(3)?,
            after_snapshot: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<RevisionRecord> {
        let timestamp = timestamp_from_millis(self.created_at)
            .ok_or_else(|| corrupt_row(self.id, "created_at is out of range"))?;
        Ok(RevisionRecord {
            id: self.id,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            before_snapshot: self.before_snapshot,
            after_snapshot: self.after_snapshot,
            timestamp,
        })
    }
}

/// SQLite `RevisionRepository` borrowing a connection for one request
pub struct SqliteRevisionRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRevisionRepository<'a> {
    /// Wrap a migrated connection and register the search function on it
    ///
    /// # Errors
    ///
    /// `Persistence` if the SQL function cannot be registered.
    pub fn new(conn: &'a Connection) -> Result<Self> {
        register_functions(conn)?;
        Ok(Self { conn })
    }
}

impl RevisionRepository for SqliteRevisionRepository<'_> {
    fn append(&self, revision: NewRevision) -> std::result::Result<RevisionRecord, ExError> {
        if revision.entity_id.trim().is_empty() {
            return Err(ExError::from(AuditError::EmptyEntityId).with_op("append_revision"));
        }
        self.conn
            .execute(
                "INSERT INTO revisions
                    (entity_type, entity_id, before_snapshot, after_snapshot, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    revision.entity_type,
                    revision.entity_id,
                    revision.before_snapshot,
                    revision.after_snapshot,
                    revision.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("append_revision")
                    .with_entity_id(revision.entity_id.clone())
            })?;

        let id = self.conn.last_insert_rowid();
        Ok(revision.into_record(id))
    }

    fn page(
        &self,
        query: &RevisionQuery,
    ) -> std::result::Result<PagedResult<RevisionRecord>, ExError> {
        query
            .validate()
            .map_err(|e| ExError::from(e).with_op("page_revisions"))?;
        let search = query.search_text();
        let op_err = |e: rusqlite::Error| {
            from_rusqlite(e)
                .with_op("page_revisions")
                .with_entity_id(query.entity_id.clone())
        };

        let total_count: i64 = self
            .conn
            .query_row(
                &format!(
                    "SELECT COUNT(*) FROM revisions WHERE entity_id = ?1 AND {}",
                    MATCHES_SEARCH
                ),
                rusqlite::params![query.entity_id, search],
                |row| row.get(0),
            )
            .map_err(op_err)?;

        let mut stmt = self
            .conn
            .prepare(&format!(
                "{} WHERE entity_id = ?1 AND {}
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?3 OFFSET ?4",
                SELECT_COLUMNS, MATCHES_SEARCH
            ))
            .map_err(op_err)?;

        let rows = stmt
            .query_map(
                rusqlite::params![
                    query.entity_id,
                    search,
                    i64::from(query.page_size),
                    query.offset() as i64
                ],
                RevisionRow::from_row,
            )
            .map_err(op_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(op_err)?;

        let items = rows
            .into_iter()
            .map(RevisionRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(
            items,
            total_count as u64,
            query.page_number,
            query.page_size,
        ))
    }

    fn get(&self, revision_id: i64) -> std::result::Result<Option<RevisionRecord>, ExError> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [revision_id],
                RevisionRow::from_row,
            )
            .optional()
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("get_revision")
                    .with_revision_id(revision_id)
            })?;
        row.map(RevisionRow::into_record).transpose()
    }

    fn delete(&self, revision_id: i64) -> std::result::Result<bool, ExError> {
        let removed = self
            .conn
            .execute("DELETE FROM revisions WHERE id = ?1", [revision_id])
            .map_err(|e| {
                from_rusqlite(e)
                    .with_op("delete_revision")
                    .with_revision_id(revision_id)
            })?;
        Ok(removed > 0)
    }
}
