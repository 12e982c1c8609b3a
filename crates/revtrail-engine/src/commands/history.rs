//! Grouped revision history view.

#![allow(clippy::result_large_err)]

use revtrail_core::config::DiffConfig;
use revtrail_core::{
    build_groups, filter_groups, log_op_end, log_op_error, log_op_start, PagedResult,
    RevisionGroup,
};
use revtrail_store::errors::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::commands::revision::fetch_revisions;

/// Default page size for history screens
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Page request for an entity's history view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub entity_id: String,
    /// 1-based
    pub page_number: u32,
    pub page_size: u32,
    /// Substring filter over raw snapshot text, applied by the store
    pub search: Option<String>,
    /// Filter over labels and formatted values, applied to built groups
    pub filter: Option<String>,
}

impl HistoryRequest {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            filter: None,
        }
    }

    pub fn page(mut self, page_number: u32, page_size: u32) -> Self {
        self.page_number = page_number;
        self.page_size = page_size;
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Fetch a page of revisions and turn it into display groups
///
/// Counts on the result are the store's counts for the underlying records;
/// groups suppressed as empty or dropped by `filter` do not change them.
///
/// # Errors
///
/// Same as [`fetch_revisions`].
pub fn revision_history(
    conn: &Connection,
    request: &HistoryRequest,
    config: &DiffConfig,
) -> Result<PagedResult<RevisionGroup>> {
    log_op_start!("revision_history", entity_id = request.entity_id.as_str());
    let start = std::time::Instant::now();

    let result = (|| -> Result<PagedResult<RevisionGroup>> {
        let page = fetch_revisions(
            conn,
            &request.entity_id,
            request.page_number,
            request.page_size,
            request.search.as_deref(),
        )?;
        let groups = build_groups(&page.items, config);
        let groups = filter_groups(groups, request.filter.as_deref(), config);
        Ok(page.with_items(groups))
    })();

    let elapsed = start.elapsed().as_millis() as u64;
    match &result {
        Ok(page) => log_op_end!(
            "revision_history",
            duration_ms = elapsed,
            group_count = page.items.len() as u64
        ),
        Err(e) => {
            let e_clone = e.clone();
            log_op_error!("revision_history", e_clone, duration_ms = elapsed);
        }
    }
    result
}
