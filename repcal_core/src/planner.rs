//! Workout planner: loaded routines and completions plus their stores.
//!
//! State is passed explicitly; the planner owns the collections loaded from
//! its stores and writes whole collections back after each mutation.

use crate::store::{CompletionStore, RoutineStore};
use crate::{
    build_month_grid, resolve, CompletionLedger, Error, MonthGrid, MonthStats, Obligation,
    Result, Routine, YearMonth,
};
use chrono::NaiveDate;

/// Routines and completion ledger backed by stores
pub struct Planner<R, C> {
    routine_store: R,
    completion_store: C,
    routines: Vec<Routine>,
    ledger: CompletionLedger,
    routines_degraded: bool,
    ledger_degraded: bool,
}

impl<R: RoutineStore, C: CompletionStore> Planner<R, C> {
    /// Load both collections
    ///
    /// A store that fails to load is replaced by an empty collection and
    /// its error is returned alongside the planner. Writes to a collection
    /// that failed to load are refused so unreadable data is never
    /// overwritten.
    pub fn load(routine_store: R, completion_store: C) -> (Self, Vec<Error>) {
        let mut errors = Vec::new();

        let (routines, routines_degraded) = match routine_store.get_all() {
            Ok(routines) => (routines, false),
            Err(e) => {
                tracing::warn!("Failed to load routines: {}. Using none.", e);
                errors.push(e);
                (Vec::new(), true)
            }
        };

        let (ledger, ledger_degraded) = match completion_store.get_all() {
            Ok(records) => (CompletionLedger::from_records(records), false),
            Err(e) => {
                tracing::warn!("Failed to load completions: {}. Using none.", e);
                errors.push(e);
                (CompletionLedger::new(), true)
            }
        };

        tracing::info!(
            "Loaded {} routines and {} completion records",
            routines.len(),
            ledger.len()
        );

        let planner = Self {
            routine_store,
            completion_store,
            routines,
            ledger,
            routines_degraded,
            ledger_degraded,
        };
        (planner, errors)
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn routine(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    pub fn ledger(&self) -> &CompletionLedger {
        &self.ledger
    }

    pub fn resolve(&self, date: NaiveDate) -> Vec<Obligation> {
        resolve(date, &self.routines, &self.ledger)
    }

    pub fn month_grid(&self, month: YearMonth) -> MonthGrid {
        build_month_grid(month, &self.routines, &self.ledger)
    }

    pub fn month_stats(&self, month: YearMonth) -> MonthStats {
        MonthStats::from_days(self.month_grid(month).days(), month)
    }

    /// Toggle completion for a key and persist the whole ledger
    ///
    /// The in-memory ledger is updated before the write. If the write fails
    /// the error is returned and the in-memory state is kept, so the ledger
    /// may be ahead of what is on disk until the next successful save.
    pub fn toggle(&mut self, date: NaiveDate, routine_id: &str, exercise_id: &str) -> Result<bool> {
        if self.ledger_degraded {
            return Err(Error::Store(
                "completions failed to load; refusing to overwrite them".into(),
            ));
        }

        let completed = self.ledger.toggle(date, routine_id, exercise_id);
        self.completion_store.replace_all(self.ledger.records())?;
        Ok(completed)
    }

    /// Append a routine and persist the collection
    pub fn add_routine(&mut self, routine: Routine) -> Result<()> {
        self.ensure_routines_writable()?;
        if self.routine(&routine.id).is_some() {
            return Err(Error::RoutineValidation(format!(
                "routine ID '{}' already exists",
                routine.id
            )));
        }

        self.routines.push(routine);
        if let Err(e) = self.routine_store.replace_all(&self.routines) {
            self.routines.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove a routine and persist the collection
    ///
    /// Completion records of the routine are kept; they no longer resolve.
    pub fn remove_routine(&mut self, id: &str) -> Result<Routine> {
        self.ensure_routines_writable()?;
        let idx = self.position(id)?;

        let removed = self.routines.remove(idx);
        if let Err(e) = self.routine_store.replace_all(&self.routines) {
            self.routines.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Activate or deactivate a routine and persist the collection
    pub fn set_routine_active(&mut self, id: &str, active: bool) -> Result<()> {
        self.ensure_routines_writable()?;
        let idx = self.position(id)?;

        let previous = std::mem::replace(&mut self.routines[idx].is_active, active);
        if let Err(e) = self.routine_store.replace_all(&self.routines) {
            self.routines[idx].is_active = previous;
            return Err(e);
        }
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.routines
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("routine '{}'", id)))
    }

    fn ensure_routines_writable(&self) -> Result<()> {
        if self.routines_degraded {
            return Err(Error::Store(
                "routines failed to load; refusing to overwrite them".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonCompletionStore, JsonRoutineStore};
    use crate::{
        sample_routines, CompletionKey, CompletionRecord, ExerciseDraft, RecurrenceRule,
        RoutineDraft,
    };
    use std::path::Path;

    /// Completion store whose writes can be made to fail
    #[derive(Default)]
    struct FlakyCompletions {
        saved: Vec<CompletionRecord>,
        fail_writes: bool,
    }

    impl CompletionStore for FlakyCompletions {
        fn get_all(&self) -> Result<Vec<CompletionRecord>> {
            Ok(self.saved.clone())
        }

        fn replace_all(&mut self, records: &[CompletionRecord]) -> Result<()> {
            if self.fail_writes {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.saved = records.to_vec();
            Ok(())
        }
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    fn seeded(dir: &Path) -> (JsonRoutineStore, JsonCompletionStore) {
        let mut routines = JsonRoutineStore::in_dir(dir);
        routines.replace_all(sample_routines()).unwrap();
        (routines, JsonCompletionStore::in_dir(dir))
    }

    #[test]
    fn test_toggle_persists_whole_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, completions) = seeded(temp_dir.path());
        let (mut planner, errors) = Planner::load(routines, completions);
        assert!(errors.is_empty());

        assert!(planner.toggle(wednesday(), "1", "1").unwrap());
        assert!(planner.toggle(wednesday(), "1", "2").unwrap());
        assert!(!planner.toggle(wednesday(), "1", "1").unwrap());

        let stored = JsonCompletionStore::in_dir(temp_dir.path()).get_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(!stored[0].completed);
        assert!(stored[1].completed);
    }

    #[test]
    fn test_reload_sees_toggles() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, completions) = seeded(temp_dir.path());
        let (mut planner, _) = Planner::load(routines, completions);
        planner.toggle(wednesday(), "1", "2").unwrap();

        let (reloaded, errors) = Planner::load(
            JsonRoutineStore::in_dir(temp_dir.path()),
            JsonCompletionStore::in_dir(temp_dir.path()),
        );
        assert!(errors.is_empty());

        let obligations = reloaded.resolve(wednesday());
        assert_eq!(obligations.len(), 3);
        assert!(!obligations[0].completed);
        assert!(obligations[1].completed);
    }

    #[test]
    fn test_save_failure_keeps_memory_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, _) = seeded(temp_dir.path());
        let completions = FlakyCompletions {
            fail_writes: true,
            ..Default::default()
        };
        let (mut planner, _) = Planner::load(routines, completions);

        let result = planner.toggle(wednesday(), "1", "1");
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(planner
            .ledger()
            .is_completed(&CompletionKey::new(wednesday(), "1", "1")));
    }

    #[test]
    fn test_corrupted_completions_degrade_to_empty() {
        crate::logging::init_test();

        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, completions) = seeded(temp_dir.path());
        std::fs::write(completions.path(), "{ invalid json }").unwrap();

        let (mut planner, errors) = Planner::load(routines, completions);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Error::Json(_)));
        assert!(planner.ledger().is_empty());

        // Resolution still works against the empty ledger
        let grid = planner.month_grid(YearMonth::new(2024, 3).unwrap());
        assert_eq!(grid.days().len(), 42);
        assert!(grid.days().iter().all(|d| d.completed_count == 0));

        // The unreadable file is left alone
        assert!(matches!(
            planner.toggle(wednesday(), "1", "1"),
            Err(Error::Store(_))
        ));
        let contents =
            std::fs::read_to_string(temp_dir.path().join(crate::store::COMPLETIONS_FILE)).unwrap();
        assert_eq!(contents, "{ invalid json }");
    }

    #[test]
    fn test_bad_record_date_does_not_hide_valid_records() {
        crate::logging::init_test();

        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, completions) = seeded(temp_dir.path());
        std::fs::write(
            completions.path(),
            r#"[{"date":"2024-02-30","routineId":"1","exerciseId":"1","completed":true},
                {"date":"2024-3-13","routineId":"1","exerciseId":"2","completed":true},
                {"date":"2024-03-13","routineId":"1","exerciseId":"3","completed":true}]"#,
        )
        .unwrap();

        let (mut planner, errors) = Planner::load(routines, completions);
        assert!(errors.is_empty());

        let done: Vec<_> = planner
            .resolve(wednesday())
            .into_iter()
            .map(|o| o.completed)
            .collect();
        assert_eq!(done, vec![false, false, true]);

        // Toggles still persist and the inert records are written back
        assert!(planner.toggle(wednesday(), "1", "2").unwrap());
        let stored = JsonCompletionStore::in_dir(temp_dir.path()).get_all().unwrap();
        let dates: Vec<_> = stored.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-30", "2024-3-13", "2024-03-13", "2024-03-13"]);
    }

    #[test]
    fn test_corrupted_routines_degrade_to_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let routines = JsonRoutineStore::in_dir(temp_dir.path());
        std::fs::write(routines.path(), "[{ not a routine").unwrap();

        let (mut planner, errors) =
            Planner::load(routines, JsonCompletionStore::in_dir(temp_dir.path()));
        assert_eq!(errors.len(), 1);
        assert!(planner.routines().is_empty());
        assert!(planner.resolve(wednesday()).is_empty());

        let routine = RoutineDraft::new("New", RecurrenceRule::Daily)
            .exercise(ExerciseDraft::named("Plank"))
            .build()
            .unwrap();
        assert!(matches!(planner.add_routine(routine), Err(Error::Store(_))));
    }

    #[test]
    fn test_routine_management() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, completions) = seeded(temp_dir.path());
        let (mut planner, _) = Planner::load(routines, completions);

        let routine = RoutineDraft::new("Stretch", RecurrenceRule::Daily)
            .exercise(ExerciseDraft::named("Hamstrings"))
            .build()
            .unwrap();
        let id = routine.id.clone();
        planner.add_routine(routine.clone()).unwrap();
        assert!(matches!(
            planner.add_routine(routine),
            Err(Error::RoutineValidation(_))
        ));
        assert_eq!(planner.resolve(wednesday()).len(), 4);

        planner.set_routine_active(&id, false).unwrap();
        assert_eq!(planner.resolve(wednesday()).len(), 3);

        let removed = planner.remove_routine("2").unwrap();
        assert_eq!(removed.name, "Cardio Session");
        assert!(matches!(planner.remove_routine("2"), Err(Error::NotFound(_))));

        let stored = JsonRoutineStore::in_dir(temp_dir.path()).get_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(!stored.iter().find(|r| r.id == id).unwrap().is_active);
    }

    #[test]
    fn test_month_stats() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (routines, completions) = seeded(temp_dir.path());
        let (mut planner, _) = Planner::load(routines, completions);

        for exercise in ["1", "2", "3"] {
            planner.toggle(wednesday(), "1", exercise).unwrap();
        }

        let stats = planner.month_stats(YearMonth::new(2024, 3).unwrap());
        assert_eq!(stats.perfect_days, 1);
        assert_eq!(stats.active_days, 1);
        assert_eq!(stats.completed_obligations, 3);
    }
}
