//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use playlog_core::UnlockMode;

/// Player game activity reports.
///
/// Reconstructs play sessions from pre-fetched activity histories (JSON) and
/// derives playtime, time-to-beat and client usage metrics.
#[derive(Debug, Parser)]
#[command(name = "playlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show every metric for each history.
    Report {
        /// History files (one object or an array of objects per file).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show play time for one unlock mode, optionally bounded.
    Playtime {
        /// History file.
        file: PathBuf,

        /// Unlock mode (hardcore or softcore).
        #[arg(long, default_value = "hardcore")]
        mode: UnlockMode,

        /// Lower bound (RFC 3339 or YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Upper bound (RFC 3339 or YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,
    },

    /// Show play time per emulator client.
    Clients {
        /// History file.
        file: PathBuf,
    },

    /// Dump the reconstructed sessions and events as JSON.
    Timeline {
        /// History file.
        file: PathBuf,
    },
}
