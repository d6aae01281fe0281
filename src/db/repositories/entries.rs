use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{connection::Database, models::HourEntry};
use crate::error::StoreError;

fn row_to_entry(row: &Row) -> Result<HourEntry> {
    Ok(HourEntry {
        id: row.get("id")?,
        date: row.get("date")?,
        hour_slot: row.get("hour_slot")?,
        text: row.get("text")?,
        tag: row.get("tag")?,
        timestamp: row.get("timestamp")?,
    })
}

const ENTRY_COLUMNS: &str = "id, date, hour_slot, text, tag, timestamp";

impl Database {
    /// Creates and persists a new entry for `hour_slot`. Fails with
    /// [`StoreError::DuplicateSlot`] if the slot is already filled; the
    /// UNIQUE index makes that atomic even when two submissions race.
    pub async fn create_entry(
        &self,
        date: &str,
        hour_slot: &str,
        text: &str,
        tag: Option<String>,
    ) -> Result<HourEntry, StoreError> {
        let timestamp = Utc::now().timestamp_millis();
        let entry = HourEntry {
            id: format!("{hour_slot}-{timestamp}"),
            date: date.to_string(),
            hour_slot: hour_slot.to_string(),
            text: text.to_string(),
            tag,
            timestamp,
        };

        self.insert_entry(entry.clone()).await?;
        Ok(entry)
    }

    /// Persists a fully-formed entry. Exists separately from
    /// [`Database::create_entry`] for import flows and tests that need to
    /// control ids and timestamps.
    pub async fn insert_entry(&self, entry: HourEntry) -> Result<(), StoreError> {
        let slot = entry.hour_slot.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO hour_entries (id, date, hour_slot, text, tag, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.id,
                    entry.date,
                    entry.hour_slot,
                    entry.text,
                    entry.tag,
                    entry.timestamp,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|err| StoreError::from_storage(err, &slot))
    }

    /// The entry for an exact slot key, if one exists. This single lookup is
    /// the prompt engine's due/not-due test.
    pub async fn entry_by_slot(&self, hour_slot: &str) -> Result<Option<HourEntry>> {
        let hour_slot = hour_slot.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM hour_entries WHERE hour_slot = ?1"
            ))?;

            let entry = stmt
                .query_row(params![hour_slot], |row| Ok(row_to_entry(row)))
                .optional()?
                .transpose()?;
            Ok(entry)
        })
        .await
    }

    /// All entries on one calendar date, ordered chronologically by slot.
    pub async fn entries_for_date(&self, date: &str) -> Result<Vec<HourEntry>> {
        let date = date.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM hour_entries
                 WHERE date = ?1
                 ORDER BY hour_slot ASC"
            ))?;

            let rows = stmt.query(params![date])?;
            collect_entries(rows)
        })
        .await
    }

    /// All entries with `date` in `[start_date, end_date]` inclusive, most
    /// recently created first. Range exports want recency; day views want
    /// chronology, which is why the ordering differs from
    /// [`Database::entries_for_date`].
    pub async fn entries_in_date_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<HourEntry>> {
        let start_date = start_date.to_string();
        let end_date = end_date.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM hour_entries
                 WHERE date >= ?1 AND date <= ?2
                 ORDER BY timestamp DESC"
            ))?;

            let rows = stmt.query(params![start_date, end_date])?;
            collect_entries(rows)
        })
        .await
    }

    /// Every entry in the journal, most recently created first.
    pub async fn all_entries(&self) -> Result<Vec<HourEntry>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM hour_entries ORDER BY timestamp DESC"
            ))?;

            let rows = stmt.query([])?;
            collect_entries(rows)
        })
        .await
    }

    /// Clears the journal. Irreversible; only the explicit data-reset flow
    /// calls this.
    pub async fn delete_all_entries(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM hour_entries", [])?;
            Ok(())
        })
        .await
    }
}

fn collect_entries(mut rows: rusqlite::Rows<'_>) -> Result<Vec<HourEntry>> {
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(row_to_entry(row)?);
    }
    Ok(entries)
}
