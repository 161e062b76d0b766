//! Calendar aggregation.
//!
//! Builds the fixed six-week month grid. Every cell is resolved, including
//! the leading and trailing days that belong to neighbouring months.

use crate::{resolve, CalendarDay, CompletionLedger, Error, Result, Routine};
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use std::fmt;

/// Number of cells in a month grid (six full weeks)
pub const GRID_DAYS: usize = 42;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A validated calendar month
///
/// Years are limited to 1..=9999 so that grid arithmetic around any month
/// stays inside chrono's representable range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=9999).contains(&year) {
            return Err(Error::InvalidDate(format!("year {} out of range", year)));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidDate(format!("month {} out of range", month)))?;
        Ok(Self { first })
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month())
    }

    /// Month containing today's local date
    pub fn current() -> Result<Self> {
        Self::of(Local::now().date_naive())
    }

    /// Parse `YYYY-MM`
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDate(format!("expected YYYY-MM, got '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.first.month0() as usize]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Following month, `None` past year 9999
    pub fn next(&self) -> Option<Self> {
        let first = self.first.checked_add_months(Months::new(1))?;
        Self::new(first.year(), first.month()).ok()
    }

    /// Preceding month, `None` before year 1
    pub fn prev(&self) -> Option<Self> {
        let first = self.first.checked_sub_months(Months::new(1))?;
        Self::new(first.year(), first.month()).ok()
    }

    /// First cell of the grid: the Sunday on or before the 1st
    pub fn grid_start(&self) -> NaiveDate {
        let back = self.first.weekday().num_days_from_sunday();
        self.first - Duration::days(i64::from(back))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// The 42-cell calendar for one month
#[derive(Clone, Debug)]
pub struct MonthGrid {
    month: YearMonth,
    days: Vec<CalendarDay>,
}

impl MonthGrid {
    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// All cells in chronological order
    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    /// Cells that belong to the grid's month
    pub fn month_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days.iter().filter(|d| d.in_month)
    }

    /// Six rows of seven days, Sunday first
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarDay]> {
        self.days.chunks(7)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn into_days(self) -> Vec<CalendarDay> {
        self.days
    }
}

/// Build the month grid for `month`
///
/// Always exactly 42 consecutive days starting at the Sunday on or before
/// the 1st. Recomputed from scratch on every call.
pub fn build_month_grid(
    month: YearMonth,
    routines: &[Routine],
    ledger: &CompletionLedger,
) -> MonthGrid {
    let start = month.grid_start();

    let days = start
        .iter_days()
        .take(GRID_DAYS)
        .map(|date| {
            let obligations = resolve(date, routines, ledger);
            CalendarDay::from_obligations(date, month.contains(date), obligations)
        })
        .collect();

    MonthGrid { month, days }
}
