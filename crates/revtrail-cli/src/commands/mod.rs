pub mod capture;
pub mod delete;
pub mod history;

use revtrail_core_types::RequestContext;
use rusqlite::Connection;
use std::path::Path;

/// Open (creating if needed) and migrate the ledger at `db`
pub fn open_db(db: &str) -> Result<Connection, Box<dyn std::error::Error>> {
    if let Some(parent) = Path::new(db).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(revtrail_store::db::open_ledger(db)?)
}

/// Context for one CLI invocation
pub fn request_context() -> RequestContext {
    RequestContext::new().with_actor("cli")
}
