//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use spendly_core::{AppConfig, Database};

/// Load configuration, letting `--db` win over the file
pub fn load_config(config_path: Option<&Path>, db_override: Option<&Path>) -> Result<AppConfig> {
    let mut config = AppConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(db) = db_override {
        config.database_path = db.to_path_buf();
    }
    Ok(config)
}

/// Open (and migrate) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: spendly import --user alice --file alice.json");
    println!("  2. Forecast: spendly predict --user alice");

    Ok(())
}
