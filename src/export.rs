//! Flat export formatting for entries and day views. File generation and
//! download live with the UI collaborators; this module only produces the
//! content.

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::{daily_log::DailyLog, db::HourEntry, timeslot};

const ENTRY_CSV_HEADER: &str = "Date,Time Slot,Text,Tag,Timestamp";
const DAILY_CSV_HEADER: &str = "Date,Time Slot,Text,Tag,Status";

/// One entry per row, every cell quoted, embedded quotes doubled.
pub fn entries_to_csv(entries: &[HourEntry]) -> Result<String> {
    let mut lines = vec![ENTRY_CSV_HEADER.to_string()];
    for entry in entries {
        lines.push(csv_row(&[
            &entry.date,
            &timeslot::format_slot_as_range(&entry.hour_slot)?,
            &entry.text,
            entry.tag.as_deref().unwrap_or(""),
            &iso_timestamp(entry.timestamp)?,
        ]));
    }
    Ok(lines.join("\n"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRecord<'a> {
    date: &'a str,
    time_slot: String,
    hour_slot: &'a str,
    text: &'a str,
    tag: Option<&'a str>,
    timestamp: String,
}

/// Pretty JSON array, one record per entry.
pub fn entries_to_json(entries: &[HourEntry]) -> Result<String> {
    let records = entries
        .iter()
        .map(|entry| {
            Ok(ExportRecord {
                date: &entry.date,
                time_slot: timeslot::format_slot_as_range(&entry.hour_slot)?,
                hour_slot: &entry.hour_slot,
                text: &entry.text,
                tag: entry.tag.as_deref(),
                timestamp: iso_timestamp(entry.timestamp)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(serde_json::to_string_pretty(&records)?)
}

/// Day-view export: one row per expected slot, gaps included. A report that
/// hid missing hours would defeat the product's purpose.
pub fn daily_log_to_csv(log: &DailyLog) -> String {
    let mut lines = vec![DAILY_CSV_HEADER.to_string()];
    for slot in &log.slots {
        let (text, tag, status) = match &slot.entry {
            Some(entry) => (
                entry.text.as_str(),
                entry.tag.as_deref().unwrap_or(""),
                "logged",
            ),
            None => ("", "", "missing"),
        };
        lines.push(csv_row(&[&log.date, &slot.time_range, text, tag, status]));
    }
    lines.join("\n")
}

fn csv_row(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

fn iso_timestamp(epoch_ms: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| anyhow!("timestamp {epoch_ms} out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily_log::LogSlot;

    fn entry(slot: &str, text: &str, tag: Option<&str>, timestamp: i64) -> HourEntry {
        HourEntry {
            id: format!("{slot}-{timestamp}"),
            date: slot[..10].to_string(),
            hour_slot: slot.to_string(),
            text: text.to_string(),
            tag: tag.map(str::to_string),
            timestamp,
        }
    }

    #[test]
    fn csv_quotes_every_cell_and_escapes_quotes() {
        let entries = vec![entry(
            "2026-01-05 09:00",
            "said \"ship it\" twice",
            Some("work"),
            1_767_603_600_000,
        )];
        let csv = entries_to_csv(&entries).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), "Date,Time Slot,Text,Tag,Timestamp");
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"2026-01-05\",\"9:00 AM – 10:00 AM\","));
        assert!(row.contains("\"said \"\"ship it\"\" twice\""));
        assert!(row.contains("\"work\""));
        assert!(row.ends_with("Z\""));
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_leaves_absent_tag_empty() {
        let entries = vec![entry("2026-01-05 09:00", "no tag on this one", None, 0)];
        let csv = entries_to_csv(&entries).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",\"\","));
    }

    #[test]
    fn json_export_carries_both_slot_forms() {
        let entries = vec![entry(
            "2026-01-05 14:00",
            "afternoon deep work block",
            None,
            1_767_621_600_000,
        )];
        let json = entries_to_json(&entries).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let record = &parsed[0];
        assert_eq!(record["hourSlot"], "2026-01-05 14:00");
        assert_eq!(record["timeSlot"], "2:00 PM – 3:00 PM");
        assert_eq!(record["tag"], serde_json::Value::Null);
        assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn daily_log_csv_keeps_missing_rows_visible() {
        let log = DailyLog {
            date: "2026-01-05".to_string(),
            formatted_date: "January 5, 2026".to_string(),
            slots: vec![
                LogSlot {
                    hour_slot: "2026-01-05 08:00".to_string(),
                    time_range: "8:00 AM – 9:00 AM".to_string(),
                    entry: Some(entry("2026-01-05 08:00", "morning standup and email", None, 0)),
                },
                LogSlot {
                    hour_slot: "2026-01-05 09:00".to_string(),
                    time_range: "9:00 AM – 10:00 AM".to_string(),
                    entry: None,
                },
            ],
            missing_count: 1,
            total_hours: 2,
        };

        let csv = daily_log_to_csv(&log);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("\"logged\""));
        assert_eq!(
            lines[2],
            "\"2026-01-05\",\"9:00 AM – 10:00 AM\",\"\",\"\",\"missing\""
        );
    }
}
