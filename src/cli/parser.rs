use crate::config::Backend;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for pointstracker
#[derive(Parser)]
#[command(
    name = "pointstracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Student participation points tracker: REST API server and admin tools",
    long_about = None
)]
pub struct Cli {
    /// Override database path (forces the SQLite backend)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Read configuration from this file instead of ~/.pointstracker/pointstracker.conf
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration, the database and the admin account
    Init,

    /// Run the REST API server
    Serve {
        #[arg(long, help = "Address to bind (default 0.0.0.0)")]
        host: Option<String>,

        #[arg(long, help = "Port to listen on (default 3001)")]
        port: Option<u16>,

        #[arg(long, value_enum, help = "Persistence backend")]
        backend: Option<Backend>,

        #[arg(
            long = "static-dir",
            value_name = "DIR",
            help = "Serve a built front end from this directory"
        )]
        static_dir: Option<String>,
    },

    /// Show current standings with tiers
    List,

    /// Print the most recent activity log entries
    Log {
        #[arg(
            long,
            short,
            help = "Number of entries to show (default: activity_log_limit from the config)"
        )]
        limit: Option<i64>,
    },

    /// Export standings to a file
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(
            long,
            value_name = "FILE",
            help = "Output file (default points-tracker-<date>.<ext>)"
        )]
        file: Option<String>,

        #[arg(long, short = 'f', help = "Overwrite an existing file")]
        force: bool,
    },
}
