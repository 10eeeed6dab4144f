//! CLI definitions for Comptoir.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Comptoir CLI.
#[derive(Parser)]
#[command(name = "comptoir")]
#[command(about = "Business-management backend: scheduled jobs and document presentation")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/comptoir.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the job dispatcher in foreground (default)
    Run,

    /// List registered jobs with their next occurrence
    Jobs {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show which jobs would fire at a given instant, without running them
    Tick {
        /// Instant to evaluate (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Validate the configuration and the job table, then exit
    Check,
}
