//! Engine-level read-only query surface.
//!
//! `apply_engine_query` is the single entry point for history reads. It
//! accepts a shared connection and never writes to the ledger.

#![allow(clippy::result_large_err)]

use revtrail_core::config::DiffConfig;
use revtrail_core::{PagedResult, RevisionGroup, RevisionRecord};
use revtrail_core_types::RequestContext;
use revtrail_store::errors::Result;
use rusqlite::Connection;

use crate::commands::history::{revision_history, HistoryRequest};
use crate::commands::revision::fetch_revisions;

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// Raw revision records, newest first. `filter` is ignored.
    RevisionPage(HistoryRequest),
    /// Display groups for one page of revisions.
    RevisionHistory(HistoryRequest),
}

/// Result of an engine query.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineQueryResult {
    RevisionPage(PagedResult<RevisionRecord>),
    RevisionHistory(PagedResult<RevisionGroup>),
}

/// Apply a read-only query.
///
/// # Errors
///
/// `InvalidInput` for bad paging arguments; `Persistence` when the ledger
/// cannot be read. Errors carry the request id of `ctx`.
pub fn apply_engine_query(
    query: EngineQuery,
    conn: &Connection,
    config: &DiffConfig,
    ctx: &RequestContext,
) -> Result<EngineQueryResult> {
    tracing::debug!(request_id = ctx.request_id.as_str(), query = ?query, "engine query");
    let result = match query {
        EngineQuery::RevisionPage(request) => fetch_revisions(
            conn,
            &request.entity_id,
            request.page_number,
            request.page_size,
            request.search.as_deref(),
        )
        .map(EngineQueryResult::RevisionPage),

        EngineQuery::RevisionHistory(request) => {
            revision_history(conn, &request, config).map(EngineQueryResult::RevisionHistory)
        }
    };
    result.map_err(|e| e.with_request_id(ctx.request_id.clone()))
}
