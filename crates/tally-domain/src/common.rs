//! Identifiers, shared traits, and date helpers used across the ledger.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Storage-assigned identifier of a persisted transaction.
pub type TransactionId = i64;

/// Opaque identifier of a category owned by the category manager.
pub type CategoryId = i64;

/// Persisted and displayed timestamp layout (second precision).
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only layout accepted from user input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Returns the current local time with sub-second precision dropped.
pub fn now() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// Drops the sub-second component so values survive a round trip through storage.
pub fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

/// First instant of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Last whole second of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    date.and_time(last)
}

/// Inclusive bounds of a calendar month, or `None` when `month` is out of range.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next.pred_opt()?;
    Some((start_of_day(first), end_of_day(last)))
}
