//! Routine catalog: sample routines, the routine builder, and validation.

use crate::recurrence::{is_canonical_date, weekday_name};
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use uuid::Uuid;

/// Cached sample routines - built once and reused
static SAMPLE_ROUTINES: Lazy<Vec<Routine>> = Lazy::new(build_sample_routines);

/// Default targets for an exercise added without any
const DEFAULT_SETS: u32 = 3;
const DEFAULT_REPS: u32 = 10;

/// Routines written for a fresh install
pub fn sample_routines() -> &'static [Routine] {
    &SAMPLE_ROUTINES
}

fn build_sample_routines() -> Vec<Routine> {
    let exercise = |id: &str,
                    name: &str,
                    sets: Option<u32>,
                    reps: Option<u32>,
                    duration: Option<u32>| Exercise {
        id: id.into(),
        name: name.into(),
        sets,
        reps,
        duration,
        weight: None,
    };

    vec![
        Routine {
            id: "1".into(),
            name: "Morning Strength".into(),
            exercises: vec![
                exercise("1", "Push-ups", Some(3), Some(15), None),
                exercise("2", "Squats", Some(3), Some(20), None),
                exercise("3", "Plank", None, None, Some(60)),
            ],
            // Mon, Wed, Fri
            schedule: RecurrenceRule::Weekdays {
                days: [1, 3, 5].into_iter().collect(),
            },
            is_active: true,
        },
        Routine {
            id: "2".into(),
            name: "Cardio Session".into(),
            exercises: vec![
                exercise("4", "Running", None, None, Some(1800)),
                exercise("5", "Jumping Jacks", Some(3), Some(30), None),
            ],
            // Tue, Thu
            schedule: RecurrenceRule::Weekdays {
                days: [2, 4].into_iter().collect(),
            },
            is_active: true,
        },
    ]
}

/// An exercise as entered, before it has an id
#[derive(Clone, Debug, Default)]
pub struct ExerciseDraft {
    pub name: String,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub duration: Option<u32>,
    pub weight: Option<f64>,
}

impl ExerciseDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A routine as entered, validated and assigned ids by [`RoutineDraft::build`]
#[derive(Clone, Debug)]
pub struct RoutineDraft {
    pub name: String,
    pub exercises: Vec<ExerciseDraft>,
    pub schedule: RecurrenceRule,
    pub is_active: bool,
}

impl RoutineDraft {
    pub fn new(name: impl Into<String>, schedule: RecurrenceRule) -> Self {
        Self {
            name: name.into(),
            exercises: Vec::new(),
            schedule,
            is_active: true,
        }
    }

    pub fn exercise(mut self, exercise: ExerciseDraft) -> Self {
        self.exercises.push(exercise);
        self
    }

    /// Validate the draft and turn it into a routine with fresh ids
    pub fn build(self) -> Result<Routine> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::RoutineValidation("routine name is empty".into()));
        }
        if self.exercises.is_empty() {
            return Err(Error::RoutineValidation(format!(
                "routine '{}' has no exercises",
                name
            )));
        }
        if let Some(problem) = schedule_problem(&self.schedule) {
            return Err(Error::RoutineValidation(format!("routine '{}': {}", name, problem)));
        }
        if !self.schedule.is_resolvable() {
            tracing::warn!(
                "Routine '{}' uses a custom schedule, which is never placed on the calendar",
                name
            );
        }

        let mut exercises = Vec::with_capacity(self.exercises.len());
        for draft in self.exercises {
            let exercise_name = draft.name.trim();
            if exercise_name.is_empty() {
                return Err(Error::RoutineValidation(format!(
                    "routine '{}' has an exercise with an empty name",
                    name
                )));
            }

            let untargeted = draft.sets.is_none()
                && draft.reps.is_none()
                && draft.duration.is_none()
                && draft.weight.is_none();

            exercises.push(Exercise {
                id: Uuid::new_v4().to_string(),
                name: exercise_name.to_string(),
                sets: if untargeted { Some(DEFAULT_SETS) } else { draft.sets },
                reps: if untargeted { Some(DEFAULT_REPS) } else { draft.reps },
                duration: draft.duration,
                weight: draft.weight,
            });
        }

        Ok(Routine {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            exercises,
            schedule: self.schedule,
            is_active: self.is_active,
        })
    }
}

/// Structural problem with a schedule, if any
fn schedule_problem(schedule: &RecurrenceRule) -> Option<String> {
    match schedule {
        RecurrenceRule::Weekdays { days } if days.is_empty() => {
            Some("select at least one weekday".into())
        }
        RecurrenceRule::Weekdays { days } => days
            .iter()
            .find(|d| weekday_name(**d).is_none())
            .map(|d| format!("weekday index {} is outside 0..=6", d)),
        RecurrenceRule::SpecificDates { dates } => dates
            .iter()
            .find(|d| !is_canonical_date(d))
            .map(|d| format!("date '{}' is not in YYYY-MM-DD form", d)),
        RecurrenceRule::Custom { interval: Some(0) } => Some("interval must be positive".into()),
        RecurrenceRule::Daily | RecurrenceRule::Custom { .. } => None,
    }
}

/// Validate a loaded routine collection
///
/// Returns a list of problems; an empty list means the collection is
/// consistent. Problems never stop resolution, which treats malformed
/// schedules as never matching.
pub fn validate_routines(routines: &[Routine]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_routines = HashSet::new();

    for routine in routines {
        if routine.id.is_empty() {
            errors.push(format!("Routine '{}' has empty ID", routine.name));
        } else if !seen_routines.insert(routine.id.as_str()) {
            errors.push(format!("Duplicate routine ID '{}'", routine.id));
        }
        if routine.name.trim().is_empty() {
            errors.push(format!("Routine '{}' has empty name", routine.id));
        }
        if routine.exercises.is_empty() {
            errors.push(format!("Routine '{}' has no exercises", routine.id));
        }

        let mut seen_exercises = HashSet::new();
        for exercise in &routine.exercises {
            if exercise.id.is_empty() {
                errors.push(format!(
                    "Routine '{}' has an exercise with empty ID",
                    routine.id
                ));
            } else if !seen_exercises.insert(exercise.id.as_str()) {
                errors.push(format!(
                    "Routine '{}' has duplicate exercise ID '{}'",
                    routine.id, exercise.id
                ));
            }
        }

        if let Some(problem) = schedule_problem(&routine.schedule) {
            errors.push(format!("Routine '{}': {}", routine.id, problem));
        }
    }

    errors
}
