//! Delete command

use clap::Args;
use revtrail_engine::commands::engine_command::{apply_engine_command, EngineCommand};

use crate::commands::{open_db, request_context};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(long, default_value = ".revtrail/ledger.db")]
    pub db: String,

    /// Revision id to remove
    #[arg(long)]
    pub id: i64,
}

pub fn execute(args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(&args.db)?;
    apply_engine_command(
        EngineCommand::DeleteRevision {
            revision_id: args.id,
        },
        &conn,
        &request_context(),
    )?;
    println!("Deleted revision #{}", args.id);
    Ok(())
}
