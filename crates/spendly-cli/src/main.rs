//! Spendly CLI - Per-category spending forecasts
//!
//! Usage:
//!   spendly init                              Initialize database
//!   spendly import --user ID --file doc.json  Import a user's transactions
//!   spendly predict --user ID                 Forecast the next 30 days
//!   spendly serve --port 5000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.db.as_deref())?;
    let db_path = config.database_path.clone();

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Import { user, file, append } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_import(&db, &user, &file, append)
        }
        Commands::Users { action } => {
            let db = commands::open_db(&db_path)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add { id }) => commands::cmd_users_add(&db, &id),
                Some(UsersAction::Delete { id }) => commands::cmd_users_delete(&db, &id),
            }
        }
        Commands::Predict {
            user,
            details,
            json,
        } => {
            let db = commands::open_db(&db_path)?;
            commands::cmd_predict(&db, &user, details, json, config.fit)
        }
        Commands::Serve { port, host } => commands::cmd_serve(config, host, port).await,
    }
}
