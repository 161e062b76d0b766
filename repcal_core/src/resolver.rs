//! Obligation resolver.
//!
//! Maps a date, the routine set and the completion ledger to the ordered
//! list of exercise obligations due that date. Pure and total over any
//! well-formed input, including empty collections.

use crate::{CompletionKey, CompletionLedger, Obligation, Routine};
use chrono::NaiveDate;

/// Resolve the obligations due on `date`
///
/// Order is routine order, then exercise order within each routine.
/// Inactive routines contribute nothing; missing completion records
/// resolve as not completed.
pub fn resolve(
    date: NaiveDate,
    routines: &[Routine],
    ledger: &CompletionLedger,
) -> Vec<Obligation> {
    routines
        .iter()
        .filter(|r| r.is_active && r.schedule.matches(date))
        .flat_map(|routine| {
            routine.exercises.iter().map(move |exercise| {
                let key = CompletionKey::new(date, routine.id.as_str(), exercise.id.as_str());
                Obligation {
                    id: format!("{}-{}", routine.id, exercise.id),
                    routine_id: routine.id.clone(),
                    exercise_id: exercise.id.clone(),
                    label: format!("{}: {}", routine.name, exercise.name),
                    completed: ledger.is_completed(&key),
                    date,
                }
            })
        })
        .collect()
}
