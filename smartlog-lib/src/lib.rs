// src/lib.rs
use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

// --- Declare modules ---
pub mod api;
pub mod calendar;
mod config;
pub mod history;
pub mod models;
pub mod planner;
pub mod workout;

// --- Expose public types ---
pub use api::{ApiClient, ApiError};
pub use calendar::{
    days_in_month, is_leap_year, month_cells, year_grid, CalendarError, GridCell, YearGrid,
    MONTH_NAMES, WEEKDAY_NAMES,
};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, save as save_config_util,
    Config, ConfigError,
};
pub use history::{
    exercises_with_metric1, max_metric1_by_date, metric1_unit_for, sets_for_exercise, SessionIndex,
};
pub use models::{
    CategoryKind, Exercise, FieldConfigUpdate, FieldMetadata, Session, SessionCreate, Template,
    TemplateCreate, TemplateExercise, WorkoutSet, WorkoutSetCreate, BODYWEIGHT_VALUE,
};
pub use planner::{category_fallback, dedup_preserving_order, template_exercise_names};
pub use workout::{FlowError, LoggingState, SetDraft, SummaryState, WorkoutFlow};

/// Service facade over config + API client.
///
/// Applies the failure taxonomy: reads degrade to empty collections (the UI
/// renders "no data" instead of crashing), writes surface errors for the
/// caller to display and retry, and template pre-fill silently falls back to
/// the category projection.
pub struct LogService {
    pub config: Config,
    pub config_path: PathBuf,
    pub api: ApiClient,
}

impl LogService {
    /// Initializes the service: loads (or creates) the config file and builds
    /// the API client from it.
    ///
    /// # Errors
    /// Returns `anyhow::Error` if config path determination, loading, or
    /// client construction fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;
        Self::with_config(config, config_path)
    }

    /// Builds a service from an explicit config; used by tests to point the
    /// client at a mock server.
    ///
    /// # Errors
    /// Returns `anyhow::Error` if the HTTP client cannot be constructed.
    pub fn with_config(config: Config, config_path: PathBuf) -> Result<Self> {
        let api = ApiClient::new(
            config.resolved_api_base_url(),
            Duration::from_secs(config.request_timeout_secs),
        )
        .context("Failed to build API client")?;
        Ok(Self {
            config,
            config_path,
            api,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the current configuration state.
    ///
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    // --- Reads (degrade to empty on failure) ---

    /// The exercise catalog; empty on backend failure.
    pub async fn exercises(&self) -> Vec<Exercise> {
        match self.api.fetch_exercises().await {
            Ok(list) => list,
            Err(e) => {
                warn!("failed to fetch exercises, rendering empty catalog: {e}");
                Vec::new()
            }
        }
    }

    /// All sessions with nested sets; empty on backend failure.
    pub async fn sessions(&self) -> Vec<Session> {
        match self.api.fetch_sessions().await {
            Ok(list) => list,
            Err(e) => {
                warn!("failed to fetch sessions, rendering empty history: {e}");
                Vec::new()
            }
        }
    }

    /// Most recent logged sets for an exercise; empty on backend failure.
    pub async fn latest_sets(&self, exercise_name: &str) -> Vec<WorkoutSet> {
        match self.api.fetch_latest_sets(exercise_name).await {
            Ok(list) => list,
            Err(e) => {
                warn!("failed to fetch latest sets for '{exercise_name}': {e}");
                Vec::new()
            }
        }
    }

    /// All saved templates; empty on backend failure.
    pub async fn templates(&self) -> Vec<Template> {
        match self.api.fetch_templates().await {
            Ok(list) => list,
            Err(e) => {
                warn!("failed to fetch templates: {e}");
                Vec::new()
            }
        }
    }

    // --- Workout setup ---

    /// Resolves the ordered exercise list for a workout target.
    ///
    /// `None` means a custom workout (empty list, the user builds it by
    /// hand). For a named target, the most recent session with that name
    /// wins; an empty answer or any backend failure falls back to the
    /// category projection — pre-fill is a convenience and must never block
    /// manual entry.
    pub async fn resolve_workout_exercises(
        &self,
        target: Option<&str>,
        catalog: &[Exercise],
    ) -> Vec<String> {
        let Some(name) = target else {
            return Vec::new();
        };
        match self.api.fetch_latest_session_exercises(name).await {
            Ok(list) if !list.is_empty() => dedup_preserving_order(list),
            Ok(_) => category_fallback(catalog, name),
            Err(e) => {
                warn!("latest-session lookup for '{name}' failed, using category fallback: {e}");
                category_fallback(catalog, name)
            }
        }
    }

    /// Builds the initial set rows for each selected exercise.
    ///
    /// Historical sets are fetched concurrently (one request per exercise,
    /// no ordering requirement between them) and merged into a map keyed by
    /// exercise name, so completion order is immaterial. Single-entry
    /// categories get one row, multi-set categories the configured default;
    /// rows beyond the available history start empty with the definition's
    /// first allowed units.
    pub async fn prefill_sets(
        &self,
        exercises: &[String],
        catalog: &[Exercise],
    ) -> HashMap<String, Vec<SetDraft>> {
        let fetches = exercises.iter().map(|name| async move {
            let history = self.latest_sets(name).await;
            (name.clone(), history)
        });

        let mut prefill = HashMap::with_capacity(exercises.len());
        for (name, history) in join_all(fetches).await {
            let definition = catalog.iter().find(|e| e.name == name);
            prefill.insert(name, build_rows(definition, &history, self.config.default_set_count));
        }
        prefill
    }

    // --- Writes (surfaced to the caller) ---

    /// Creates the session. Must be awaited to completion before any
    /// transition to the summary view.
    ///
    /// # Errors
    /// Returns `anyhow::Error` on transport failure or a non-2xx response;
    /// the caller shows a dismissible error and may retry.
    pub async fn save_session(&self, payload: &SessionCreate) -> Result<Session> {
        self.api
            .create_session(payload)
            .await
            .with_context(|| format!("Failed to save workout session '{}'", payload.name))
    }

    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the create.
    pub async fn create_template(&self, template: &TemplateCreate) -> Result<Template> {
        self.api
            .create_template(template)
            .await
            .with_context(|| format!("Failed to create template '{}'", template.name))
    }

    /// Renames a template without touching its exercise list.
    ///
    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the update.
    pub async fn rename_template(&self, id: i64, name: String) -> Result<Template> {
        let patch = TemplateCreate {
            name,
            exercise_ids: None,
        };
        self.api
            .patch_template(id, &patch)
            .await
            .with_context(|| format!("Failed to rename template {id}"))
    }

    /// Replaces a template's name and exercise list wholesale.
    ///
    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the update.
    pub async fn replace_template(&self, id: i64, template: &TemplateCreate) -> Result<Template> {
        self.api
            .update_template(id, template)
            .await
            .with_context(|| format!("Failed to update template {id}"))
    }

    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the delete.
    pub async fn delete_template(&self, id: i64) -> Result<()> {
        self.api
            .delete_template(id)
            .await
            .with_context(|| format!("Failed to delete template {id}"))
    }

    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the update.
    pub async fn add_template_exercise(&self, template_id: i64, exercise_id: i64) -> Result<()> {
        self.api
            .add_template_exercise(template_id, exercise_id)
            .await
            .with_context(|| format!("Failed to add exercise {exercise_id} to template {template_id}"))
    }

    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the update.
    pub async fn remove_template_exercise(&self, template_id: i64, exercise_id: i64) -> Result<()> {
        self.api
            .remove_template_exercise(template_id, exercise_id)
            .await
            .with_context(|| {
                format!("Failed to remove exercise {exercise_id} from template {template_id}")
            })
    }

    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the reorder.
    pub async fn reorder_template_exercises(
        &self,
        template_id: i64,
        exercise_ids: &[i64],
    ) -> Result<()> {
        self.api
            .reorder_template_exercises(template_id, exercise_ids)
            .await
            .with_context(|| format!("Failed to reorder exercises of template {template_id}"))
    }

    /// # Errors
    /// Returns `anyhow::Error` if the backend rejects the update.
    pub async fn update_field_config(
        &self,
        exercise_id: i64,
        visible_fields: Vec<String>,
    ) -> Result<()> {
        self.api
            .update_field_config(exercise_id, &FieldConfigUpdate { visible_fields })
            .await
            .with_context(|| format!("Failed to update field config for exercise {exercise_id}"))
    }
}

fn build_rows(
    definition: Option<&Exercise>,
    history: &[WorkoutSet],
    multi_set_default: usize,
) -> Vec<SetDraft> {
    let count = definition.map_or(multi_set_default.max(1), |def| {
        def.category_type.default_set_count(multi_set_default)
    });
    (0..count)
        .map(|i| {
            let number = i as u32 + 1;
            history
                .get(i)
                .map_or_else(|| SetDraft::empty(number, definition), |set| {
                    SetDraft::from_history(number, set)
                })
        })
        .collect()
}
