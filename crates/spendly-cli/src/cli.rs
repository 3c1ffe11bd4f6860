//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendly - Forecast next month's spending per category
#[derive(Parser)]
#[command(name = "spendly")]
#[command(about = "Per-category 30-day spending forecasts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a user's transactions from a JSON document
    ///
    /// The document has the form {"transactions": {"Category": [{"date": ..., "amount": ...}]}}
    /// and replaces any records previously stored for the user unless --append is given.
    Import {
        /// User to import for
        #[arg(short, long)]
        user: String,

        /// JSON document to import
        #[arg(short, long)]
        file: PathBuf,

        /// Keep existing records and add these to them
        #[arg(long)]
        append: bool,
    },

    /// List users, or manage them
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Forecast a user's spending for the next 30 days
    Predict {
        /// User to forecast
        #[arg(short, long)]
        user: String,

        /// Show the sufficiency score and method per category
        #[arg(long)]
        details: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users and their record counts
    List,

    /// Register a user with no records yet
    Add {
        /// User ID
        id: String,
    },

    /// Delete a user and all their records
    Delete {
        /// User ID
        id: String,
    },
}
