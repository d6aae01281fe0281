use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use crate::db::connection::Database;

/// Fixed key of the singleton settings row.
pub const SETTINGS_KEY: &str = "appSettings";

impl Database {
    /// Raw JSON blob of the persisted settings record, if one exists.
    pub async fn read_settings_blob(&self) -> Result<Option<String>> {
        self.execute(|conn| {
            let blob = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![SETTINGS_KEY],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(blob)
        })
        .await
    }

    /// Upserts the singleton settings row.
    pub async fn write_settings_blob(&self, value: String) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![SETTINGS_KEY, value],
            )?;
            Ok(())
        })
        .await
    }
}
