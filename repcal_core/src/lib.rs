#![forbid(unsafe_code)]

//! Core domain model and scheduling logic for repcal.
//!
//! This crate provides:
//! - Domain types (routines, recurrence rules, completions, calendar days)
//! - Recurrence matching and obligation resolution
//! - Completion ledger with first-touch toggle semantics
//! - Month grid aggregation and monthly statistics
//! - Persistence (JSON stores, CSV export) and configuration

pub mod types;
pub mod error;
pub mod recurrence;
pub mod ledger;
pub mod resolver;
pub mod calendar;
pub mod stats;
pub mod catalog;
pub mod store;
pub mod planner;
pub mod config;
pub mod logging;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use ledger::CompletionLedger;
pub use resolver::resolve;
pub use calendar::{build_month_grid, MonthGrid, YearMonth, GRID_DAYS};
pub use stats::MonthStats;
pub use catalog::{sample_routines, validate_routines, ExerciseDraft, RoutineDraft};
pub use store::{CompletionStore, JsonCompletionStore, JsonRoutineStore, RoutineStore};
pub use planner::Planner;
pub use config::Config;
pub use csv_export::export_month_csv;
