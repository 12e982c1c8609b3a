//! Engine-level write commands.

#![allow(clippy::result_large_err)]

use revtrail_core::errors::AuditError;
use revtrail_core::{log_op_end, log_op_error, log_op_start, RevisionRecord};
use revtrail_core_types::RequestContext;
use revtrail_store::errors::Result;
use rusqlite::Connection;
use serde_json::Value;

use crate::commands::revision::{capture_mutation, delete_revision};

/// Engine-level commands that write to the ledger.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Record a committed mutation (best-effort).
    CaptureMutation {
        entity_type: String,
        entity_id: String,
        before: Value,
        after: Value,
    },
    /// Administrative delete of one revision.
    DeleteRevision { revision_id: i64 },
}

/// Result of applying an engine command.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommandResult {
    /// `None` when nothing changed or the audit write failed.
    Captured(Option<RevisionRecord>),
    Deleted { revision_id: i64 },
}

/// Apply an engine command.
///
/// # Errors
///
/// `NotFound` when deleting a revision that does not exist; `Persistence`
/// when the ledger cannot be written. Capture never fails.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &Connection,
    ctx: &RequestContext,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::CaptureMutation {
            entity_type,
            entity_id,
            before,
            after,
        } => {
            tracing::debug!(
                request_id = ctx.request_id.as_str(),
                entity_id = entity_id.as_str(),
                "capture requested"
            );
            Ok(EngineCommandResult::Captured(capture_mutation(
                conn,
                &entity_type,
                &entity_id,
                &before,
                &after,
            )))
        }

        EngineCommand::DeleteRevision { revision_id } => {
            log_op_start!(
                "engine_delete_revision",
                request_id = ctx.request_id.as_str(),
                revision_id = revision_id
            );
            let start = std::time::Instant::now();

            let result = delete_revision(conn, revision_id).and_then(|removed| {
                if removed {
                    Ok(EngineCommandResult::Deleted { revision_id })
                } else {
                    Err(AuditError::RevisionNotFound { revision_id }.into())
                }
            });

            let elapsed = start.elapsed().as_millis() as u64;
            match result {
                Ok(r) => {
                    log_op_end!("engine_delete_revision", duration_ms = elapsed);
                    Ok(r)
                }
                Err(e) => {
                    let e = e
                        .with_op("engine_delete_revision")
                        .with_request_id(ctx.request_id.clone());
                    log_op_error!("engine_delete_revision", e.clone(), duration_ms = elapsed);
                    Err(e)
                }
            }
        }
    }
}
