//! Core domain types for the repcal workout scheduler.
//!
//! This module defines the fundamental types used throughout the system:
//! - Routines, their exercises and recurrence rules
//! - Completion records and their uniqueness key
//! - Derived obligations and calendar days
//!
//! Stored types serialize in camelCase so that routine and completion
//! collections written by the mobile app can be read as-is.

use crate::recurrence::{canonical_date, is_canonical_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Routine Types
// ============================================================================

/// A single exercise within a routine, with optional targets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Target duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Exercise {
    /// Short human summary of the targets, e.g. `3x15`, `60s`, `3x5 @ 80`
    pub fn target_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        match (self.sets, self.reps) {
            (Some(sets), Some(reps)) => parts.push(format!("{}x{}", sets, reps)),
            (Some(sets), None) => parts.push(format!("{} sets", sets)),
            (None, Some(reps)) => parts.push(format!("{} reps", reps)),
            (None, None) => {}
        }
        if let Some(duration) = self.duration {
            parts.push(format!("{}s", duration));
        }
        if let Some(weight) = self.weight {
            parts.push(format!("@ {}", weight));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Declarative schedule attached to a routine
///
/// Weekday indices run 0..=6 with 0 = Sunday. Specific dates are kept
/// verbatim as stored; only canonical `YYYY-MM-DD` strings can ever match.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrenceRule {
    SpecificDates {
        #[serde(default)]
        dates: BTreeSet<String>,
    },
    Weekdays {
        #[serde(rename = "weekdays", default)]
        days: BTreeSet<u8>,
    },
    Daily,
    /// Interval schedule with no anchor; never matches any date
    Custom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<u32>,
    },
}

/// A named, schedulable collection of exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
    pub schedule: RecurrenceRule,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// ============================================================================
// Completion Types
// ============================================================================

/// Uniqueness key of the completion ledger
///
/// The date is compared as the stored string. Lookups always use the
/// canonical `YYYY-MM-DD` form, so a record stored under any other
/// spelling never matches a calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionKey {
    pub date: String,
    pub routine_id: String,
    pub exercise_id: String,
}

impl CompletionKey {
    /// Key for a calendar date, in canonical form
    pub fn new(
        date: NaiveDate,
        routine_id: impl Into<String>,
        exercise_id: impl Into<String>,
    ) -> Self {
        Self::from_stored(canonical_date(date), routine_id, exercise_id)
    }

    /// Key for a date string exactly as it was stored
    pub fn from_stored(
        date: impl Into<String>,
        routine_id: impl Into<String>,
        exercise_id: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            routine_id: routine_id.into(),
            exercise_id: exercise_id.into(),
        }
    }
}

/// One persisted completion toggle
///
/// `date` stays a string so records written by other tools round-trip
/// untouched, even when they do not hold a valid calendar date.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub date: String,
    pub routine_id: String,
    pub exercise_id: String,
    pub completed: bool,
}

impl CompletionRecord {
    /// A completed record for a calendar date
    pub fn completed_on(date: NaiveDate, routine_id: &str, exercise_id: &str) -> Self {
        Self {
            date: canonical_date(date),
            routine_id: routine_id.to_string(),
            exercise_id: exercise_id.to_string(),
            completed: true,
        }
    }

    pub fn key(&self) -> CompletionKey {
        CompletionKey::from_stored(
            self.date.clone(),
            self.routine_id.clone(),
            self.exercise_id.clone(),
        )
    }

    /// Whether the stored date can ever match a calendar day
    pub fn has_canonical_date(&self) -> bool {
        is_canonical_date(&self.date)
    }
}

// ============================================================================
// Derived Types
// ============================================================================

/// A single (routine, exercise) pairing due on a date; never persisted
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Obligation {
    /// `<routine_id>-<exercise_id>`
    pub id: String,
    pub routine_id: String,
    pub exercise_id: String,
    /// `<routine name>: <exercise name>`
    pub label: String,
    pub completed: bool,
    pub date: NaiveDate,
}

/// Aggregated view of all obligations for one grid cell
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Whether the date belongs to the month the grid was built for
    pub in_month: bool,
    pub has_obligations: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub obligations: Vec<Obligation>,
}

impl CalendarDay {
    /// Build a day from resolved obligations, deriving the counts
    pub fn from_obligations(date: NaiveDate, in_month: bool, obligations: Vec<Obligation>) -> Self {
        let total_count = obligations.len();
        let completed_count = obligations.iter().filter(|o| o.completed).count();
        Self {
            date,
            in_month,
            has_obligations: total_count > 0,
            completed_count,
            total_count,
            obligations,
        }
    }

    /// Completion ratio in 0.0..=1.0, used only for shading
    pub fn intensity(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.completed_count as f64 / self.total_count as f64
    }

    /// Some but not all obligations done
    pub fn is_partial(&self) -> bool {
        self.completed_count > 0 && self.completed_count < self.total_count
    }

    /// Every obligation done, and there was at least one
    pub fn is_perfect(&self) -> bool {
        self.total_count > 0 && self.completed_count == self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obligation(completed: bool) -> Obligation {
        Obligation {
            id: "r-e".into(),
            routine_id: "r".into(),
            exercise_id: "e".into(),
            label: "R: E".into(),
            completed,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_routine_reads_app_json() {
        let json = r#"{
            "id": "1",
            "name": "Morning Strength",
            "exercises": [
                { "id": "1", "name": "Push-ups", "sets": 3, "reps": 15 },
                { "id": "3", "name": "Plank", "duration": 60 }
            ],
            "schedule": { "type": "weekdays", "weekdays": [1, 3, 5] },
            "isActive": true
        }"#;

        let routine: Routine = serde_json::from_str(json).unwrap();
        assert_eq!(routine.exercises.len(), 2);
        assert_eq!(routine.exercises[1].duration, Some(60));
        assert_eq!(
            routine.schedule,
            RecurrenceRule::Weekdays {
                days: [1, 3, 5].into_iter().collect()
            }
        );
        assert!(routine.is_active);
    }

    #[test]
    fn test_schedule_with_missing_fields() {
        let weekdays: RecurrenceRule = serde_json::from_str(r#"{ "type": "weekdays" }"#).unwrap();
        assert_eq!(weekdays, RecurrenceRule::Weekdays { days: BTreeSet::new() });

        let custom: RecurrenceRule = serde_json::from_str(r#"{ "type": "custom" }"#).unwrap();
        assert_eq!(custom, RecurrenceRule::Custom { interval: None });

        let daily: RecurrenceRule = serde_json::from_str(r#"{ "type": "daily" }"#).unwrap();
        assert_eq!(daily, RecurrenceRule::Daily);
    }

    #[test]
    fn test_completion_record_camel_case() {
        let record =
            CompletionRecord::completed_on(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), "1", "2");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"routineId\":\"1\""));
        assert!(json.contains("\"date\":\"2024-03-15\""));
    }

    #[test]
    fn test_stored_date_is_kept_verbatim() {
        let json = r#"[
            {"date": "2024-3-13", "routineId": "1", "exerciseId": "1", "completed": true},
            {"date": "2024-02-30", "routineId": "1", "exerciseId": "1", "completed": true}
        ]"#;
        let records: Vec<CompletionRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records[0].date, "2024-3-13");
        assert_eq!(records[1].date, "2024-02-30");
        assert!(!records[0].has_canonical_date());
        assert!(!records[1].has_canonical_date());

        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_ne!(records[0].key(), CompletionKey::new(wednesday, "1", "1"));
    }

    #[test]
    fn test_calendar_day_counts() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let day = CalendarDay::from_obligations(
            date,
            true,
            vec![obligation(true), obligation(false), obligation(false), obligation(true)],
        );

        assert!(day.has_obligations);
        assert_eq!(day.total_count, 4);
        assert_eq!(day.completed_count, 2);
        assert!((day.intensity() - 0.5).abs() < f64::EPSILON);
        assert!(day.is_partial());
        assert!(!day.is_perfect());
    }

    #[test]
    fn test_empty_day_has_zero_intensity() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let day = CalendarDay::from_obligations(date, false, vec![]);

        assert!(!day.has_obligations);
        assert_eq!(day.intensity(), 0.0);
        assert!(!day.is_partial());
        assert!(!day.is_perfect());
    }

    #[test]
    fn test_target_summary() {
        let exercise = Exercise {
            id: "1".into(),
            name: "Bench Press".into(),
            sets: Some(3),
            reps: Some(5),
            duration: None,
            weight: Some(80.0),
        };
        assert_eq!(exercise.target_summary().as_deref(), Some("3x5 @ 80"));

        let plank = Exercise {
            id: "2".into(),
            name: "Plank".into(),
            sets: None,
            reps: None,
            duration: Some(60),
            weight: None,
        };
        assert_eq!(plank.target_summary().as_deref(), Some("60s"));
    }
}
