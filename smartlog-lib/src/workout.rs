//! The workout flow state machine: Setup → Logging → Summary.
//!
//! Transitions are strictly linear with one back-edge (Logging → Setup,
//! discarding edits) and one reset edge (Summary → Setup). Logging is only
//! reachable with a non-empty exercise list, and Summary only after the
//! session POST has completed — `begin_save`/`save_succeeded` make the save
//! the synchronization point and double as the re-entrancy guard against
//! duplicate submission.

use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{
    Exercise, Session, SessionCreate, WorkoutSet, WorkoutSetCreate, BODYWEIGHT_VALUE,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("cannot start logging with an empty exercise list")]
    NoExercises,
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("operation requires the {0} state")]
    InvalidState(&'static str),
    #[error("exercise is not part of this workout: {0}")]
    UnknownExercise(String),
    #[error("'{0}' is single-entry; sets cannot be added")]
    SingleEntry(String),
    #[error("no set at index {0}")]
    NoSuchSet(usize),
}

/// One editable set row. `set_number` stays a contiguous 1-based sequence
/// because rows are only ever appended or popped from the end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetDraft {
    pub set_number: u32,
    pub metric1_value: Option<String>,
    pub metric1_unit: Option<String>,
    pub metric2_value: Option<String>,
    pub metric2_unit: Option<String>,
    pub metric3_value: Option<String>,
    pub metric3_unit: Option<String>,
}

impl SetDraft {
    /// Empty row with units defaulted from the exercise definition.
    #[must_use]
    pub fn empty(set_number: u32, definition: Option<&Exercise>) -> Self {
        Self {
            set_number,
            metric1_unit: definition.map(Exercise::default_metric1_unit),
            metric2_unit: definition.map(Exercise::default_metric2_unit),
            metric3_unit: definition.and_then(Exercise::default_metric3_unit),
            ..Default::default()
        }
    }

    /// Row pre-filled from a historical set (values and units both carry
    /// over; only the position is renumbered).
    #[must_use]
    pub fn from_history(set_number: u32, set: &WorkoutSet) -> Self {
        Self {
            set_number,
            metric1_value: set.metric1_value.clone(),
            metric1_unit: set.metric1_unit.clone(),
            metric2_value: set.metric2_value.clone(),
            metric2_unit: set.metric2_unit.clone(),
            metric3_value: set.metric3_value.clone(),
            metric3_unit: set.metric3_unit.clone(),
        }
    }

    #[must_use]
    pub fn is_bodyweight(&self) -> bool {
        self.metric1_value.as_deref() == Some(BODYWEIGHT_VALUE)
    }
}

/// In-progress workout edits while in the Logging state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingState {
    pub workout_name: String,
    pub date: NaiveDate,
    exercises: Vec<String>,
    sets: HashMap<String, Vec<SetDraft>>,
    saving: bool,
}

impl LoggingState {
    fn new(
        workout_name: String,
        date: NaiveDate,
        exercises: Vec<String>,
        mut prefill: HashMap<String, Vec<SetDraft>>,
    ) -> Self {
        let sets = exercises
            .iter()
            .map(|name| (name.clone(), prefill.remove(name).unwrap_or_default()))
            .collect();
        Self {
            workout_name,
            date,
            exercises,
            sets,
            saving: false,
        }
    }

    #[must_use]
    pub fn exercises(&self) -> &[String] {
        &self.exercises
    }

    #[must_use]
    pub fn sets_for(&self, exercise: &str) -> &[SetDraft] {
        self.sets.get(exercise).map_or(&[], Vec::as_slice)
    }

    /// Appends an empty set row, numbered after the last. Single-entry
    /// categories (cardio, recovery) are rejected.
    pub fn add_set(&mut self, definition: &Exercise) -> Result<(), FlowError> {
        if definition.category_type.is_single_entry() {
            return Err(FlowError::SingleEntry(definition.name.clone()));
        }
        let rows = self
            .sets
            .get_mut(&definition.name)
            .ok_or_else(|| FlowError::UnknownExercise(definition.name.clone()))?;
        let next = rows.len() as u32 + 1;
        rows.push(SetDraft::empty(next, Some(definition)));
        Ok(())
    }

    /// Removes the last set row. Arbitrary mid-list deletion is deliberately
    /// unsupported; remove-last is the only way numbers stay contiguous.
    pub fn remove_last_set(&mut self, exercise: &str) -> Result<(), FlowError> {
        let rows = self
            .sets
            .get_mut(exercise)
            .ok_or_else(|| FlowError::UnknownExercise(exercise.to_string()))?;
        rows.pop().map(|_| ()).ok_or(FlowError::NoSuchSet(0))
    }

    /// Flips metric 1 between the bodyweight sentinel and unset.
    pub fn toggle_bodyweight(&mut self, exercise: &str, index: usize) -> Result<(), FlowError> {
        let row = self.set_mut(exercise, index)?;
        row.metric1_value = if row.is_bodyweight() {
            None
        } else {
            Some(BODYWEIGHT_VALUE.to_string())
        };
        Ok(())
    }

    /// Mutable access to one set row for value/unit edits.
    pub fn set_mut(&mut self, exercise: &str, index: usize) -> Result<&mut SetDraft, FlowError> {
        self.sets
            .get_mut(exercise)
            .ok_or_else(|| FlowError::UnknownExercise(exercise.to_string()))?
            .get_mut(index)
            .ok_or(FlowError::NoSuchSet(index))
    }

    /// Adds an exercise mid-logging with caller-supplied (pre-filled) rows.
    /// Already-present exercises are left untouched.
    pub fn add_exercise(&mut self, name: &str, rows: Vec<SetDraft>) {
        if self.exercises.iter().any(|e| e == name) {
            return;
        }
        self.exercises.push(name.to_string());
        self.sets.insert(name.to_string(), rows);
    }

    /// Flattens the per-exercise rows into a creation payload, in exercise
    /// order.
    #[must_use]
    pub fn to_session_create(&self) -> SessionCreate {
        let sets = self
            .exercises
            .iter()
            .flat_map(|name| {
                self.sets_for(name).iter().map(|row| WorkoutSetCreate {
                    exercise: name.clone(),
                    set_number: row.set_number,
                    metric1_value: row.metric1_value.clone(),
                    metric1_unit: row.metric1_unit.clone(),
                    metric2_value: row.metric2_value.clone(),
                    metric2_unit: row.metric2_unit.clone(),
                    metric3_value: row.metric3_value.clone(),
                    metric3_unit: row.metric3_unit.clone(),
                })
            })
            .collect();
        SessionCreate {
            name: self.workout_name.clone(),
            date: self.date,
            sets,
        }
    }
}

/// Terminal state after a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryState {
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutFlow {
    Setup,
    Logging(LoggingState),
    Summary(SummaryState),
}

impl Default for WorkoutFlow {
    fn default() -> Self {
        Self::Setup
    }
}

impl WorkoutFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::Setup
    }

    #[must_use]
    pub fn logging(&self) -> Option<&LoggingState> {
        match self {
            Self::Logging(state) => Some(state),
            _ => None,
        }
    }

    pub fn logging_mut(&mut self) -> Option<&mut LoggingState> {
        match self {
            Self::Logging(state) => Some(state),
            _ => None,
        }
    }

    /// Setup → Logging. Rejected outside Setup and for an empty exercise
    /// list; exercises missing from the prefill map start with no rows.
    pub fn start_logging(
        &mut self,
        workout_name: String,
        date: NaiveDate,
        exercises: Vec<String>,
        prefill: HashMap<String, Vec<SetDraft>>,
    ) -> Result<(), FlowError> {
        if !matches!(self, Self::Setup) {
            return Err(FlowError::InvalidState("Setup"));
        }
        if exercises.is_empty() {
            return Err(FlowError::NoExercises);
        }
        *self = Self::Logging(LoggingState::new(workout_name, date, exercises, prefill));
        Ok(())
    }

    /// Logging → Setup, discarding in-progress edits. Refused while a save is
    /// in flight.
    pub fn back_to_setup(&mut self) -> Result<(), FlowError> {
        match self {
            Self::Logging(state) if state.saving => Err(FlowError::SaveInFlight),
            Self::Logging(_) => {
                *self = Self::Setup;
                Ok(())
            }
            _ => Err(FlowError::InvalidState("Logging")),
        }
    }

    /// Marks a save in flight and returns the payload to POST. A second call
    /// before `save_succeeded`/`save_failed` is an error — this is the guard
    /// against duplicate submission.
    pub fn begin_save(&mut self) -> Result<SessionCreate, FlowError> {
        match self {
            Self::Logging(state) => {
                if state.saving {
                    return Err(FlowError::SaveInFlight);
                }
                state.saving = true;
                Ok(state.to_session_create())
            }
            _ => Err(FlowError::InvalidState("Logging")),
        }
    }

    /// Clears the in-flight flag after a failed POST; edits are kept so the
    /// user can retry.
    pub fn save_failed(&mut self) -> Result<(), FlowError> {
        match self {
            Self::Logging(state) => {
                state.saving = false;
                Ok(())
            }
            _ => Err(FlowError::InvalidState("Logging")),
        }
    }

    /// Logging → Summary, only after the server accepted the session.
    pub fn save_succeeded(&mut self, session: Session) -> Result<(), FlowError> {
        match self {
            Self::Logging(state) if state.saving => {
                *self = Self::Summary(SummaryState { session });
                Ok(())
            }
            Self::Logging(_) => Err(FlowError::InvalidState("Logging (saving)")),
            _ => Err(FlowError::InvalidState("Logging")),
        }
    }

    /// Summary → Setup, clearing all transient state.
    pub fn done(&mut self) -> Result<(), FlowError> {
        match self {
            Self::Summary(_) => {
                *self = Self::Setup;
                Ok(())
            }
            _ => Err(FlowError::InvalidState("Summary")),
        }
    }
}
