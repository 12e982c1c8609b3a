//! Capture command

use clap::Args;
use revtrail_engine::commands::engine_command::{
    apply_engine_command, EngineCommand, EngineCommandResult,
};
use revtrail_store::errors::io_error;
use serde_json::Value;
use std::path::Path;

use crate::commands::{open_db, request_context};

#[derive(Debug, Args)]
pub struct CaptureArgs {
    #[arg(long, default_value = ".revtrail/ledger.db")]
    pub db: String,

    /// Aggregate kind, e.g. contract, order, reseller, address
    #[arg(long)]
    pub entity_type: String,

    #[arg(long)]
    pub entity: String,

    /// JSON file holding the state before the mutation
    #[arg(long)]
    pub before: String,

    /// JSON file holding the state after the mutation
    #[arg(long)]
    pub after: String,
}

fn read_state(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(Path::new(path)).map_err(|e| io_error("read_snapshot", e))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {}", path, e))?;
    Ok(value)
}

pub fn execute(args: CaptureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let before = read_state(&args.before)?;
    let after = read_state(&args.after)?;
    let conn = open_db(&args.db)?;

    let cmd = EngineCommand::CaptureMutation {
        entity_type: args.entity_type,
        entity_id: args.entity.clone(),
        before,
        after,
    };

    match apply_engine_command(cmd, &conn, &request_context())? {
        EngineCommandResult::Captured(Some(record)) => {
            println!("Recorded revision #{} for {}", record.id, record.entity_id);
        }
        EngineCommandResult::Captured(None) => {
            println!("No change recorded for {}", args.entity);
        }
        EngineCommandResult::Deleted { .. } => {}
    }
    Ok(())
}
