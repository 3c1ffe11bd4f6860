//! Transaction record operations

use rusqlite::params;
use tracing::info;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{StoredRecord, UserDocument};

impl Database {
    /// Append records for a user, creating the user if needed
    pub fn insert_records(&self, user_id: &str, records: &[StoredRecord]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO users (id) VALUES (?)",
            params![user_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (user_id, category, date, amount) VALUES (?, ?, ?, ?)",
            )?;
            for record in records {
                stmt.execute(params![user_id, record.category, record.date, record.amount])?;
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    /// Replace a user's records with the contents of a nested document
    pub fn import_user_document(&self, user_id: &str, document: UserDocument) -> Result<usize> {
        let records = document.into_records();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO users (id) VALUES (?)",
            params![user_id],
        )?;
        tx.execute(
            "DELETE FROM transactions WHERE user_id = ?",
            params![user_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (user_id, category, date, amount) VALUES (?, ?, ?, ?)",
            )?;
            for record in &records {
                stmt.execute(params![user_id, record.category, record.date, record.amount])?;
            }
        }

        tx.commit()?;

        info!(user = %user_id, records = records.len(), "Imported user document");
        Ok(records.len())
    }

    /// Load every stored record for a user
    ///
    /// Fails with `NotFound` if the user does not exist; a known user with no
    /// records yields an empty vector.
    pub fn load_user_records(&self, user_id: &str) -> Result<Vec<StoredRecord>> {
        if !self.user_exists(user_id)? {
            return Err(Error::NotFound(format!("User not found: {}", user_id)));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, date, amount FROM transactions WHERE user_id = ? ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![user_id], |row| {
                Ok(StoredRecord {
                    category: row.get(0)?,
                    date: row.get(1)?,
                    amount: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
