use serde::{Deserialize, Serialize};

/// One user-submitted journal record. Immutable once created; at most one
/// exists per `hour_slot`, enforced by a UNIQUE index at the store level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HourEntry {
    /// Derived from the slot key plus the creation instant, so ids stay
    /// unique even if the wall clock repeats an hour.
    pub id: String,
    /// Calendar date (`YYYY-MM-DD`) the slot's start falls on.
    pub date: String,
    /// Canonical slot key, `YYYY-MM-DD HH:00`.
    pub hour_slot: String,
    pub text: String,
    pub tag: Option<String>,
    /// Creation instant, epoch milliseconds.
    pub timestamp: i64,
}
