//! Routine and completion persistence with file locking.
//!
//! Both collections are stored as JSON arrays and are only ever read or
//! replaced whole. Writes go through a locked temp file that is synced and
//! renamed over the original, so readers see either the old or the new
//! collection. Concurrent writers are not coordinated beyond that: the last
//! replace wins.

use crate::{sample_routines, CompletionRecord, Error, Result, Routine};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the routine collection inside the data directory
pub const ROUTINES_FILE: &str = "workout_routines.json";

/// File name of the completion collection inside the data directory
pub const COMPLETIONS_FILE: &str = "workout_completions.json";

/// Whole-collection access to routines
pub trait RoutineStore {
    fn get_all(&self) -> Result<Vec<Routine>>;
    fn replace_all(&mut self, routines: &[Routine]) -> Result<()>;
}

/// Whole-collection access to completion records
pub trait CompletionStore {
    fn get_all(&self) -> Result<Vec<CompletionRecord>>;
    fn replace_all(&mut self, records: &[CompletionRecord]) -> Result<()>;
}

/// Routine collection stored as a JSON array
pub struct JsonRoutineStore {
    path: PathBuf,
}

impl JsonRoutineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default file name inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(ROUTINES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl RoutineStore for JsonRoutineStore {
    fn get_all(&self) -> Result<Vec<Routine>> {
        let routines: Vec<Routine> = read_json_array(&self.path)?;
        tracing::debug!("Read {} routines from {:?}", routines.len(), self.path);
        Ok(routines)
    }

    fn replace_all(&mut self, routines: &[Routine]) -> Result<()> {
        write_json_atomic(&self.path, routines)?;
        tracing::debug!("Saved {} routines to {:?}", routines.len(), self.path);
        Ok(())
    }
}

/// Completion collection stored as a JSON array
pub struct JsonCompletionStore {
    path: PathBuf,
}

impl JsonCompletionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default file name inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(COMPLETIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompletionStore for JsonCompletionStore {
    fn get_all(&self) -> Result<Vec<CompletionRecord>> {
        let records: Vec<CompletionRecord> = read_json_array(&self.path)?;
        tracing::debug!("Read {} completions from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn replace_all(&mut self, records: &[CompletionRecord]) -> Result<()> {
        write_json_atomic(&self.path, records)?;
        tracing::debug!("Saved {} completions to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// Write the sample routines if no routine file exists yet
///
/// Returns whether anything was written.
pub fn seed_if_missing(store: &mut JsonRoutineStore) -> Result<bool> {
    if store.exists() {
        return Ok(false);
    }
    store.replace_all(sample_routines())?;
    tracing::info!("Seeded sample routines at {:?}", store.path());
    Ok(true)
}

/// Read a JSON array under a shared lock; a missing file is empty
fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!("No file at {:?}, treating as empty", path);
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&contents)?)
}

/// Replace `path` atomically with the JSON encoding of `items`
///
/// 1. Write to a temp file in the same directory under an exclusive lock
/// 2. Sync to disk
/// 3. Rename over the original
fn write_json_atomic<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("{:?} has no parent directory", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer(&mut writer, items)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::canonical_date;
    use chrono::NaiveDate;

    fn record(day: u32, completed: bool) -> CompletionRecord {
        CompletionRecord {
            date: canonical_date(NaiveDate::from_ymd_opt(2024, 3, day).unwrap()),
            routine_id: "1".into(),
            exercise_id: "2".into(),
            completed,
        }
    }

    #[test]
    fn test_completions_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonCompletionStore::in_dir(temp_dir.path());

        let records = vec![record(1, true), record(2, false)];
        store.replace_all(&records).unwrap();

        assert_eq!(store.get_all().unwrap(), records);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonCompletionStore::in_dir(temp_dir.path());
        assert!(store.get_all().unwrap().is_empty());

        let routines = JsonRoutineStore::in_dir(temp_dir.path());
        assert!(!routines.exists());
        assert!(routines.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonCompletionStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "{ invalid json }").unwrap();

        assert!(matches!(store.get_all(), Err(Error::Json(_))));
    }

    #[test]
    fn test_replace_all_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonCompletionStore::in_dir(temp_dir.path());

        store.replace_all(&[record(1, true), record(2, true)]).unwrap();
        store.replace_all(&[record(3, true)]).unwrap();

        let loaded = store.get_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], record(3, true));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonCompletionStore::in_dir(temp_dir.path());
        store.replace_all(&[record(1, true)]).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != COMPLETIONS_FILE)
            .collect();
        assert!(extras.is_empty(), "Found extras: {:?}", extras);
    }

    #[test]
    fn test_creates_missing_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let mut store = JsonRoutineStore::in_dir(&nested);

        store.replace_all(sample_routines()).unwrap();
        assert!(nested.join(ROUTINES_FILE).exists());
    }

    #[test]
    fn test_seed_if_missing_only_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonRoutineStore::in_dir(temp_dir.path());

        assert!(seed_if_missing(&mut store).unwrap());
        assert_eq!(store.get_all().unwrap().len(), sample_routines().len());

        store.replace_all(&[]).unwrap();
        assert!(!seed_if_missing(&mut store).unwrap());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_reads_app_storage_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonCompletionStore::in_dir(temp_dir.path());
        std::fs::write(
            store.path(),
            r#"[{"date":"2024-03-13","routineId":"1","exerciseId":"2","completed":true}]"#,
        )
        .unwrap();

        let records = store.get_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].routine_id, "1");
        assert!(records[0].completed);
    }

    #[test]
    fn test_unparseable_record_date_loads_and_round_trips() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonCompletionStore::in_dir(temp_dir.path());
        std::fs::write(
            store.path(),
            r#"[{"date":"2024-02-30","routineId":"1","exerciseId":"2","completed":true},
                {"date":"2024-03-13","routineId":"1","exerciseId":"2","completed":true}]"#,
        )
        .unwrap();

        let records = store.get_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, "2024-02-30");

        store.replace_all(&records).unwrap();
        assert_eq!(store.get_all().unwrap(), records);
    }
}
