//! Aggregation of raw sessions into the lookups the history and dashboard
//! views need. Pure transformations; nothing here touches the network.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{Session, WorkoutSet};

/// Sessions grouped by calendar date, preserving input order within a date.
#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    by_date: BTreeMap<NaiveDate, Vec<Session>>,
}

impl SessionIndex {
    #[must_use]
    pub fn build(sessions: &[Session]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<Session>> = BTreeMap::new();
        for session in sessions {
            by_date.entry(session.date).or_default().push(session.clone());
        }
        Self { by_date }
    }

    /// Sessions logged on a given day, in original input order.
    #[must_use]
    pub fn sessions_on(&self, date: NaiveDate) -> &[Session] {
        self.by_date.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Number of sessions on a day (0 if none). Drives contribution-cell
    /// coloring.
    #[must_use]
    pub fn count_by_date(&self, date: NaiveDate) -> usize {
        self.by_date.get(&date).map_or(0, Vec::len)
    }

    /// Days that have at least one session, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }
}

/// Every set of the named exercise across all sessions, sessions ordered by
/// date descending (stable, so same-day sessions keep input order), set order
/// within a session preserved. Callers take the first N for pre-fill.
#[must_use]
pub fn sets_for_exercise(sessions: &[Session], exercise_name: &str) -> Vec<WorkoutSet> {
    let mut matching: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.sets.iter().any(|set| set.exercise == exercise_name))
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));

    matching
        .iter()
        .flat_map(|s| s.sets.iter().filter(|set| set.exercise == exercise_name))
        .cloned()
        .collect()
}

/// Chart series for an exercise: one point per session that has at least one
/// numeric metric-1 value for it, `(date, max value)`, ascending by date.
/// Null and non-numeric values (including the `"BW"` sentinel) are ignored;
/// ties keep the first occurrence in stored set order.
#[must_use]
pub fn max_metric1_by_date(sessions: &[Session], exercise_name: &str) -> Vec<(NaiveDate, f64)> {
    let mut points: Vec<(NaiveDate, f64)> = sessions
        .iter()
        .filter_map(|session| {
            let max = session
                .sets
                .iter()
                .filter(|set| set.exercise == exercise_name)
                .filter_map(WorkoutSet::metric1_numeric)
                .fold(None::<f64>, |acc, v| match acc {
                    Some(best) if v > best => Some(v),
                    Some(best) => Some(best),
                    None => Some(v),
                });
            max.map(|value| (session.date, value))
        })
        .collect();
    points.sort_by_key(|(date, _)| *date);
    points
}

/// Sorted distinct exercise names that have at least one non-null metric-1
/// value anywhere in the history. Populates the chart's exercise picker.
#[must_use]
pub fn exercises_with_metric1(sessions: &[Session]) -> Vec<String> {
    let mut names: Vec<String> = sessions
        .iter()
        .flat_map(|s| s.sets.iter())
        .filter(|set| set.metric1_value.is_some())
        .map(|set| set.exercise.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Display unit for an exercise's metric 1: taken from the first set with a
/// value, scanning sessions in input order.
#[must_use]
pub fn metric1_unit_for(sessions: &[Session], exercise_name: &str) -> Option<String> {
    sessions
        .iter()
        .flat_map(|s| s.sets.iter())
        .find(|set| set.exercise == exercise_name && set.metric1_value.is_some())
        .and_then(|set| set.metric1_unit.clone())
}
