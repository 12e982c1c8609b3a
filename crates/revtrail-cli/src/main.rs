//! revtrail CLI
//!
//! Command-line interface for the entity revision ledger

use clap::{Parser, Subcommand};
use revtrail_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "revtrail")]
#[command(about = "revtrail - Entity revision audit and history", long_about = None)]
struct Cli {
    /// Logging profile: dev, prod or test
    #[arg(long, global = true, default_value = "dev")]
    log_profile: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show an entity's change history
    History(commands::history::HistoryArgs),
    /// Record a before/after pair for an entity
    Capture(commands::capture::CaptureArgs),
    /// Delete one revision by id
    Delete(commands::delete::DeleteArgs),
}

fn main() {
    let cli = Cli::parse();

    let profile = Profile::parse(&cli.log_profile).unwrap_or(Profile::Development);
    logging_facility::init(profile);

    let result = match cli.command {
        Commands::History(args) => commands::history::execute(args),
        Commands::Capture(args) => commands::capture::execute(args),
        Commands::Delete(args) => commands::delete::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
