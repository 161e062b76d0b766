//! Monthly aggregate statistics over calendar days.

use crate::{CalendarDay, YearMonth};
use serde::Serialize;

/// Summary counts for the days of one month
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthStats {
    /// Days where every obligation was completed (and there was one)
    pub perfect_days: usize,
    /// Days with at least one completed obligation
    pub active_days: usize,
    pub total_obligations: usize,
    pub completed_obligations: usize,
    /// Integer percentage, 0 when nothing was scheduled
    pub completion_rate: u32,
}

impl MonthStats {
    /// Aggregate `days`, counting only dates inside `month`
    ///
    /// Accepts a month grid or any other range of days.
    pub fn from_days<'a, I>(days: I, month: YearMonth) -> Self
    where
        I: IntoIterator<Item = &'a CalendarDay>,
    {
        let mut stats = MonthStats::default();

        for day in days.into_iter().filter(|d| month.contains(d.date)) {
            if day.is_perfect() {
                stats.perfect_days += 1;
            }
            if day.completed_count > 0 {
                stats.active_days += 1;
            }
            stats.total_obligations += day.total_count;
            stats.completed_obligations += day.completed_count;
        }

        stats.completion_rate =
            completion_rate(stats.completed_obligations, stats.total_obligations);
        stats
    }
}

/// Percentage of `completed` over `total`, rounded to the nearest integer
///
/// Defined as 0 when `total` is 0.
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}
