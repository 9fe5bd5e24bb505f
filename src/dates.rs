//! Calendar-day arithmetic and date input parsing.
//!
//! All scheduling works in whole calendar days on `NaiveDate`; there is no
//! notion of working days or time zones.

use chrono::{Datelike, Days, Local, NaiveDate};

use crate::error::DateOutOfRange;

/// Add a (possibly negative) number of calendar days to a date.
///
/// Fails instead of wrapping when the result falls outside chrono's range.
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate, DateOutOfRange> {
    let step = Days::new(days.unsigned_abs());
    let moved = if days >= 0 { date.checked_add_days(step) } else { date.checked_sub_days(step) };
    moved.ok_or(DateOutOfRange { date, days })
}

/// Absolute number of calendar days between two dates.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    (end - start).num_days().unsigned_abs() as u32
}

/// Every calendar day from `start` to `end`, both inclusive.
pub fn iter_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Format a date for messages, e.g. "Mar 1, 2025".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a date without the year, e.g. "Mar 1".
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Parse human-readable date input relative to the local date.
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    parse_date_input_from(s, Local::now().date_naive())
}

/// Parse human-readable date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next friday", etc.
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_date_input_from(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return add_days(today, 1).ok(),
        "yesterday" => return add_days(today, -1).ok(),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return add_days(today, days).ok();
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return weeks.checked_mul(7).and_then(|days| add_days(today, days).ok());
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];

    let current_day = today.weekday().num_days_from_monday() as i64;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name {
            return add_days(today, days_ahead).ok();
        }
        if s == format!("next {}", day_name) {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return add_days(today, days_to_add).ok();
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}
