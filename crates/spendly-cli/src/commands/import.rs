//! Import command implementation

use std::path::Path;

use anyhow::{bail, Context, Result};
use spendly_core::{models::UserDocument, Database};
use tracing::debug;

pub fn cmd_import(db: &Database, user: &str, file: &Path, append: bool) -> Result<()> {
    let user = user.trim();
    if user.is_empty() {
        bail!("User ID must not be empty");
    }

    println!("📥 Importing transactions for '{}'...", user);
    println!("   File: {}", file.display());

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document: UserDocument =
        serde_json::from_str(&content).context("Invalid transaction document")?;

    let categories = document.transactions.len();
    debug!(categories, "Parsed user document");

    let imported = if append {
        db.insert_records(user, &document.into_records())
    } else {
        db.import_user_document(user, document)
    }
    .context("Failed to store transactions")?;

    println!(
        "✅ {} {} records across {} categories",
        if append { "Appended" } else { "Imported" },
        imported,
        categories
    );

    Ok(())
}
