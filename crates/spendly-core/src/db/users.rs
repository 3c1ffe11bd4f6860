//! User operations

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::UserSummary;

impl Database {
    /// Create a user if it does not exist yet
    pub fn upsert_user(&self, user_id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (id) VALUES (?)",
            params![user_id],
        )?;
        Ok(())
    }

    /// Check whether a user exists
    pub fn user_exists(&self, user_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM users WHERE id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List users with their stored record counts
    pub fn list_users(&self) -> Result<Vec<UserSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT u.id, COUNT(t.id)
            FROM users u
            LEFT JOIN transactions t ON t.user_id = u.id
            GROUP BY u.id
            ORDER BY u.id
            "#,
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    record_count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Delete a user and their records. Returns false if the user was unknown.
    pub fn delete_user(&self, user_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![user_id])?;
        Ok(deleted > 0)
    }
}
