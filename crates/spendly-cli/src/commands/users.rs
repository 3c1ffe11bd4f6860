//! User commands

use anyhow::{bail, Result};
use spendly_core::Database;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Import with: spendly import --user ID --file doc.json");
        return Ok(());
    }

    println!("{:<30} {:>10}", "User", "Records");
    println!("{}", "─".repeat(41));
    for user in &users {
        println!("{:<30} {:>10}", user.id, user.record_count);
    }

    Ok(())
}

pub fn cmd_users_add(db: &Database, id: &str) -> Result<()> {
    let id = id.trim();
    if id.is_empty() {
        bail!("User ID must not be empty");
    }

    if db.user_exists(id)? {
        println!("User '{}' already exists", id);
    } else {
        db.upsert_user(id)?;
        println!("👤 Added user '{}'", id);
    }
    Ok(())
}

pub fn cmd_users_delete(db: &Database, id: &str) -> Result<()> {
    if db.delete_user(id)? {
        println!("🗑️  Deleted user '{}'", id);
    } else {
        println!("User '{}' not found", id);
    }
    Ok(())
}
