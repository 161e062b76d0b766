//! Completion ledger.
//!
//! A flat, ordered log of completion records keyed by
//! `(date, routine, exercise)`. At most one record exists per key; toggles
//! mutate the existing record in place. Records whose stored date is not a
//! canonical `YYYY-MM-DD` string are kept and written back as they are, but
//! never match a calendar day.

use crate::{CompletionKey, CompletionRecord};
use chrono::NaiveDate;
use std::collections::HashMap;

/// In-memory completion ledger with a key index
#[derive(Clone, Debug, Default)]
pub struct CompletionLedger {
    records: Vec<CompletionRecord>,
    index: HashMap<CompletionKey, usize>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from stored records
    ///
    /// Stored data may violate key uniqueness if it was written by another
    /// tool. The first record for a key wins and later ones are dropped.
    pub fn from_records(records: Vec<CompletionRecord>) -> Self {
        let mut ledger = Self::new();
        let mut dropped = 0;
        let mut inert = 0;

        for record in records {
            if !record.has_canonical_date() {
                inert += 1;
            }
            let key = record.key();
            if ledger.index.contains_key(&key) {
                dropped += 1;
                continue;
            }
            ledger.index.insert(key, ledger.records.len());
            ledger.records.push(record);
        }

        if dropped > 0 {
            tracing::warn!("Dropped {} duplicate completion records", dropped);
        }
        if inert > 0 {
            tracing::warn!(
                "{} completion records have a non-canonical date and will never match a day",
                inert
            );
        }
        ledger
    }

    /// Flip the completion state for a key and return the new state
    ///
    /// A key with no record is treated as "not yet addressed", so the first
    /// toggle always marks it completed.
    pub fn toggle(&mut self, date: NaiveDate, routine_id: &str, exercise_id: &str) -> bool {
        let key = CompletionKey::new(date, routine_id, exercise_id);

        if let Some(&idx) = self.index.get(&key) {
            let record = &mut self.records[idx];
            record.completed = !record.completed;
            tracing::debug!(
                "Toggled {} {}/{} to {}",
                date,
                routine_id,
                exercise_id,
                record.completed
            );
            return record.completed;
        }

        self.index.insert(key, self.records.len());
        self.records.push(CompletionRecord::completed_on(date, routine_id, exercise_id));
        tracing::debug!("Recorded first completion {} {}/{}", date, routine_id, exercise_id);
        true
    }

    pub fn get(&self, key: &CompletionKey) -> Option<&CompletionRecord> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    /// Completion state for a key, `false` when absent
    pub fn is_completed(&self, key: &CompletionKey) -> bool {
        self.get(key).map(|r| r.completed).unwrap_or(false)
    }

    /// Records in insertion order, as they are persisted
    pub fn records(&self) -> &[CompletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
