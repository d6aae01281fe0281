//! Slot calculus for the hourly journal.
//!
//! A slot key is the canonical identifier of one wall-clock hour on one
//! calendar date, string form `YYYY-MM-DD HH:00`. All computation uses the
//! local time zone: the user's "hour" is their wall-clock hour. On a
//! fall-back DST day both occurrences of the repeated hour collapse onto the
//! same slot key; on a spring-forward day the skipped hour never occurs.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Timelike};

const SLOT_KEY_LEN: usize = 16;

/// Slot key for the hour containing `instant`.
pub fn hour_slot_of(instant: DateTime<Local>) -> String {
    format!("{} {:02}:00", date_string(instant), instant.hour())
}

/// Slot key for the hour before the one containing `instant`.
pub fn previous_hour_slot(instant: DateTime<Local>) -> String {
    hour_slot_of(instant - Duration::hours(1))
}

/// Slot key for the hour containing `instant`. Alias kept for call sites
/// that pair it with [`previous_hour_slot`].
pub fn current_hour_slot(instant: DateTime<Local>) -> String {
    hour_slot_of(instant)
}

/// Local calendar date of `instant` as `YYYY-MM-DD`.
pub fn date_string(instant: DateTime<Local>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

/// Calendar date component of a slot key.
pub fn slot_date(slot: &str) -> Result<NaiveDate> {
    let (date_part, _) = split_slot(slot)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .with_context(|| format!("invalid date in slot key '{slot}'"))
}

/// Hour component (0-23) of a slot key.
pub fn slot_hour(slot: &str) -> Result<u8> {
    let (_, time_part) = split_slot(slot)?;
    let hour: u8 = time_part[..2]
        .parse()
        .with_context(|| format!("invalid hour in slot key '{slot}'"))?;
    if hour > 23 {
        bail!("hour {hour} out of range in slot key '{slot}'");
    }
    Ok(hour)
}

fn split_slot(slot: &str) -> Result<(&str, &str)> {
    if slot.len() != SLOT_KEY_LEN || !slot.ends_with(":00") {
        bail!("malformed slot key '{slot}'");
    }
    match slot.split_once(' ') {
        Some((date_part, time_part)) if date_part.len() == 10 => Ok((date_part, time_part)),
        _ => bail!("malformed slot key '{slot}'"),
    }
}

/// Human-readable range for a slot key, e.g. `"2:00 PM – 3:00 PM"`.
/// Pure string arithmetic over the key, so repeated calls on the same slot
/// always produce identical output.
pub fn format_slot_as_range(slot: &str) -> Result<String> {
    let start = slot_hour(slot)?;
    let end = (start + 1) % 24;
    Ok(format!("{} – {}", format_hour(start), format_hour(end)))
}

fn format_hour(hour: u8) -> String {
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{display}:00 {period}")
}

/// Long-form display date, e.g. `"January 5, 2026"`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Ordered slot keys a day's log is expected to contain: from
/// `day_start_hour` through the current hour when `date` is today, through
/// hour 23 otherwise. Empty when today's day start has not been reached yet.
pub fn expected_slots_for_date(
    date: NaiveDate,
    day_start_hour: u8,
    now: DateTime<Local>,
) -> Vec<String> {
    let last_hour = if date == now.date_naive() {
        now.hour() as u8
    } else {
        23
    };

    if day_start_hour > last_hour {
        return Vec::new();
    }

    (day_start_hour..=last_hour)
        .map(|hour| format!("{} {:02}:00", date.format("%Y-%m-%d"), hour))
        .collect()
}

/// Inclusive date-string bounds of the Sunday–Saturday calendar week
/// containing `reference`.
pub fn week_range(reference: DateTime<Local>) -> (String, String) {
    let days_from_sunday = reference.weekday().num_days_from_sunday() as i64;
    let start = reference.date_naive() - Duration::days(days_from_sunday);
    let end = start + Duration::days(6);
    (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}
