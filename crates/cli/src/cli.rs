use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "staysync")]
#[command(about = "Consolidated reservation ledger for a short-term-rental portfolio")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full sync cycle and rebuild the ledger
    Sync {
        /// Report unregistered OTA bookings without writing them to the sheets
        #[arg(long)]
        no_backfill: bool,
    },
    /// Check which apartments are free for a stay
    Check {
        /// Check-in date (dd/mm/yyyy or yyyy-mm-dd)
        #[arg(long)]
        from: String,
        /// Check-out date (dd/mm/yyyy or yyyy-mm-dd)
        #[arg(long)]
        to: String,
        /// Restrict the check to these apartments (default: all)
        #[arg(long, value_delimiter = ',')]
        apartments: Vec<String>,
    },
    /// Print the consolidated ledger
    Ledger,
    /// Detect double-bookings without touching the stored ledger
    Conflicts,
}
