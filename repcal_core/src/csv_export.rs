//! CSV export of a month's calendar.

use crate::recurrence::{canonical_date, weekday_index, weekday_name};
use crate::{CalendarDay, MonthGrid, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    weekday: &'static str,
    total: usize,
    completed: usize,
    intensity: String,
    obligations: String,
}

impl From<&CalendarDay> for CsvRow {
    fn from(day: &CalendarDay) -> Self {
        let obligations = day
            .obligations
            .iter()
            .map(|o| {
                if o.completed {
                    format!("[x] {}", o.label)
                } else {
                    format!("[ ] {}", o.label)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");

        CsvRow {
            date: canonical_date(day.date),
            weekday: weekday_name(weekday_index(day.date)).unwrap_or("?"),
            total: day.total_count,
            completed: day.completed_count,
            intensity: format!("{:.2}", day.intensity()),
            obligations,
        }
    }
}

/// Write one row per day of the grid's month to `path`
///
/// The file is replaced, written with headers, and synced to disk.
/// Returns the number of rows written.
pub fn export_month_csv(grid: &MonthGrid, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);

    let mut count = 0;
    for day in grid.month_days() {
        writer.serialize(CsvRow::from(day))?;
        count += 1;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} days of {} to {:?}", count, grid.month(), path);
    Ok(count)
}
