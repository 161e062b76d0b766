//! Recurrence rule evaluation.
//!
//! Each rule kind is matched exhaustively. Rules that cannot be resolved
//! (an empty weekday set, a custom interval) simply never match.

use crate::RecurrenceRule;
use chrono::{Datelike, NaiveDate};

/// Canonical calendar-date format used for specific dates and storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Weekday index with 0 = Sunday
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Short weekday name for an index, `None` outside 0..=6
pub fn weekday_name(index: u8) -> Option<&'static str> {
    WEEKDAY_NAMES.get(index as usize).copied()
}

/// Format a date the way specific dates and completion keys store it
pub fn canonical_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whether a stored date string is in canonical `YYYY-MM-DD` form
pub fn is_canonical_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(|d| canonical_date(d) == s)
        .unwrap_or(false)
}

impl RecurrenceRule {
    /// Whether this rule schedules its routine on `date`
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            RecurrenceRule::Daily => true,
            RecurrenceRule::Weekdays { days } => days.contains(&weekday_index(date)),
            RecurrenceRule::SpecificDates { dates } => dates.contains(&canonical_date(date)),
            // No anchor date exists to count intervals from.
            RecurrenceRule::Custom { .. } => false,
        }
    }

    /// False for rule kinds that are stored but never evaluated
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, RecurrenceRule::Custom { .. })
    }

    /// Human readable description, e.g. `Mon, Wed, Fri`
    pub fn describe(&self) -> String {
        match self {
            RecurrenceRule::Daily => "Every day".to_string(),
            RecurrenceRule::Weekdays { days } if days.is_empty() => "No days selected".to_string(),
            RecurrenceRule::Weekdays { days } => days
                .iter()
                .map(|d| weekday_name(*d).unwrap_or("?"))
                .collect::<Vec<_>>()
                .join(", "),
            RecurrenceRule::SpecificDates { dates } => match dates.len() {
                0 => "No dates selected".to_string(),
                1 => "1 date".to_string(),
                n => format!("{} dates", n),
            },
            RecurrenceRule::Custom { interval: Some(n) } => {
                format!("Every {} days (not scheduled)", n)
            }
            RecurrenceRule::Custom { interval: None } => "Custom (not scheduled)".to_string(),
        }
    }
}
