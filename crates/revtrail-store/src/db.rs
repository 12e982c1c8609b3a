//! Database connection management
//!
//! Provides utilities for opening and preparing SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use revtrail_core::store::contains_ignore_case;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;

/// Name of the case-insensitive substring SQL function
pub const ICONTAINS_FN: &str = "revtrail_icontains";

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection: pragmas plus the search function
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it cannot go through execute()
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(from_rusqlite)?;

    register_functions(conn)
}

/// Register `revtrail_icontains(haystack, needle)`
///
/// SQLite's `LIKE` folds ASCII only; this folds with Unicode lowercase.
pub fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        ICONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: Option<String> = ctx.get(1)?;
            Ok(match (haystack, needle) {
                (Some(h), Some(n)) => contains_ignore_case(&h, &n),
                _ => false,
            })
        },
    )
    .map_err(from_rusqlite)
}

/// Open, configure and migrate a ledger database
pub fn open_ledger<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let mut conn = open(path)?;
    configure(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

/// In-memory variant of [`open_ledger`]
pub fn open_ledger_in_memory() -> Result<Connection> {
    let mut conn = open_in_memory()?;
    configure(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}
