//! Wire types for the smartlog backend API.
//!
//! Field names follow the backend's snake_case JSON. Session dates travel as
//! `YYYY-MM-DD` strings (sometimes with a trailing `T...` timestamp portion)
//! and are decoded into plain calendar dates, never through a timezone-aware
//! type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::calendar::iso_day;

/// Sentinel metric value meaning "bodyweight" for strength sets.
pub const BODYWEIGHT_VALUE: &str = "BW";

/// The four known exercise categories. Deserializing any other string is an
/// error rather than a silent fallback.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CategoryKind {
    Strength,
    Cardio,
    Flexibility,
    Recovery,
}

/// Default metric names and allowed units for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMetadata {
    pub metric1_name: &'static str,
    pub metric1_units: &'static [&'static str],
    pub metric2_name: &'static str,
    pub metric2_units: &'static [&'static str],
    pub metric3_name: Option<&'static str>,
    pub metric3_units: Option<&'static [&'static str]>,
}

impl CategoryKind {
    /// Cardio and recovery exercises log exactly one entry; strength and
    /// flexibility log multiple sets.
    #[must_use]
    pub const fn is_single_entry(self) -> bool {
        matches!(self, Self::Cardio | Self::Recovery)
    }

    /// Rows to seed when logging starts: one for single-entry categories,
    /// the configured default otherwise.
    #[must_use]
    pub fn default_set_count(self, multi_set_default: usize) -> usize {
        if self.is_single_entry() {
            1
        } else {
            multi_set_default.max(1)
        }
    }

    /// Default field metadata for the category.
    #[must_use]
    pub const fn field_metadata(self) -> FieldMetadata {
        match self {
            Self::Strength => FieldMetadata {
                metric1_name: "Weight",
                metric1_units: &["lbs", "kg"],
                metric2_name: "Reps",
                metric2_units: &["reps"],
                metric3_name: None,
                metric3_units: None,
            },
            Self::Cardio => FieldMetadata {
                metric1_name: "Duration",
                metric1_units: &["min", "sec"],
                metric2_name: "Distance",
                metric2_units: &["mi", "km"],
                metric3_name: Some("Heart Rate"),
                metric3_units: Some(&["bpm"]),
            },
            Self::Flexibility => FieldMetadata {
                metric1_name: "Hold Time",
                metric1_units: &["sec", "min"],
                metric2_name: "Reps",
                metric2_units: &["reps"],
                metric3_name: None,
                metric3_units: None,
            },
            Self::Recovery => FieldMetadata {
                metric1_name: "Duration",
                metric1_units: &["min"],
                metric2_name: "Intensity",
                metric2_units: &["1-10"],
                metric3_name: None,
                metric3_units: None,
            },
        }
    }
}

/// An exercise definition from the catalog. `name` is the unique key used
/// everywhere else (sets reference exercises by name).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub category_type: CategoryKind,
    pub metric1_name: String,
    pub metric1_units: Vec<String>,
    pub metric2_name: String,
    pub metric2_units: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric3_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric3_units: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_config: Option<serde_json::Value>,
}

impl Exercise {
    /// First allowed unit for metric 1, falling back to the category default.
    #[must_use]
    pub fn default_metric1_unit(&self) -> String {
        self.metric1_units.first().cloned().unwrap_or_else(|| {
            self.category_type
                .field_metadata()
                .metric1_units
                .first()
                .map(|u| (*u).to_string())
                .unwrap_or_default()
        })
    }

    /// First allowed unit for metric 2, falling back to the category default.
    #[must_use]
    pub fn default_metric2_unit(&self) -> String {
        self.metric2_units.first().cloned().unwrap_or_else(|| {
            self.category_type
                .field_metadata()
                .metric2_units
                .first()
                .map(|u| (*u).to_string())
                .unwrap_or_default()
        })
    }

    /// First allowed unit for metric 3, if the exercise (or its category)
    /// defines one.
    #[must_use]
    pub fn default_metric3_unit(&self) -> Option<String> {
        if let Some(units) = &self.metric3_units {
            return units.first().cloned();
        }
        self.category_type
            .field_metadata()
            .metric3_units
            .and_then(|units| units.first().map(|u| (*u).to_string()))
    }

    /// Whether a third metric should be shown at all.
    #[must_use]
    pub fn has_metric3(&self) -> bool {
        self.metric3_name.is_some() || self.category_type.field_metadata().metric3_name.is_some()
    }
}

/// One logged set within a session. `set_number` is 1-based and contiguous
/// within an exercise within a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    pub id: i64,
    pub exercise: String,
    pub set_number: u32,
    pub metric1_value: Option<String>,
    pub metric1_unit: Option<String>,
    pub metric2_value: Option<String>,
    pub metric2_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric3_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric3_unit: Option<String>,
}

impl WorkoutSet {
    /// Metric 1 parsed as a number. `"BW"` and other non-numeric values
    /// yield `None`.
    #[must_use]
    pub fn metric1_numeric(&self) -> Option<f64> {
        self.metric1_value.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// A completed workout session with its nested sets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub id: i64,
    pub name: String,
    #[serde(with = "iso_day")]
    pub date: NaiveDate,
    pub created_at: String,
    pub sets: Vec<WorkoutSet>,
}

/// Set payload for session creation (no ids yet).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutSetCreate {
    pub exercise: String,
    pub set_number: u32,
    pub metric1_value: Option<String>,
    pub metric1_unit: Option<String>,
    pub metric2_value: Option<String>,
    pub metric2_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric3_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric3_unit: Option<String>,
}

/// POST body for creating a session atomically with all its sets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionCreate {
    pub name: String,
    #[serde(with = "iso_day")]
    pub date: NaiveDate,
    pub sets: Vec<WorkoutSetCreate>,
}

/// Membership entry of a template: which exercise, at which position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TemplateExercise {
    pub exercise_id: i64,
    pub sort_order: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    pub template_exercises: Vec<TemplateExercise>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TemplateCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_ids: Option<Vec<i64>>,
}

/// PATCH body for `/exercises/:id/field-config`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldConfigUpdate {
    pub visible_fields: Vec<String>,
}
