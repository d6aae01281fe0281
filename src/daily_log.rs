use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::{
    db::{Database, HourEntry},
    timeslot,
};

/// One expected hour slot of a day, paired with its entry if one exists.
/// A slot with no entry stays in the sequence — a missing hour is a
/// first-class, displayed state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSlot {
    pub hour_slot: String,
    pub time_range: String,
    pub entry: Option<HourEntry>,
}

impl LogSlot {
    pub fn is_missing(&self) -> bool {
        self.entry.is_none()
    }
}

/// The merged read-only view of one day's expected slots and entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub date: String,
    pub formatted_date: String,
    pub slots: Vec<LogSlot>,
    pub missing_count: usize,
    pub total_hours: usize,
}

/// Builds the daily log for `date`: expected slots from `day_start_hour`,
/// each paired with its entry or marked missing, always in chronological
/// slot order regardless of entry creation order.
pub async fn build_daily_log(
    db: &Database,
    date: NaiveDate,
    day_start_hour: u8,
    now: DateTime<Local>,
) -> Result<DailyLog> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let expected = timeslot::expected_slots_for_date(date, day_start_hour, now);

    let mut by_slot: HashMap<String, HourEntry> = db
        .entries_for_date(&date_str)
        .await?
        .into_iter()
        .map(|entry| (entry.hour_slot.clone(), entry))
        .collect();

    let mut slots = Vec::with_capacity(expected.len());
    for slot in expected {
        slots.push(LogSlot {
            time_range: timeslot::format_slot_as_range(&slot)?,
            entry: by_slot.remove(&slot),
            hour_slot: slot,
        });
    }

    let missing_count = slots.iter().filter(|slot| slot.is_missing()).count();
    let total_hours = slots.len();

    Ok(DailyLog {
        date: date_str,
        formatted_date: timeslot::format_long_date(date),
        slots,
        missing_count,
        total_hours,
    })
}
