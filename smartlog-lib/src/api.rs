//! Typed async client for the smartlog REST backend.
//!
//! All requests are JSON; non-2xx responses become `ApiError::Status` with the
//! body captured for diagnostics. Failure policy (degrade vs. surface) lives
//! one layer up in the service, not here.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::models::{
    Exercise, FieldConfigUpdate, Session, SessionCreate, Template, TemplateCreate, WorkoutSet,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client for the given base URL (e.g.
    /// `http://localhost:8000/api`).
    ///
    /// # Errors
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Maps a non-2xx response to `ApiError::Status`, logging the error body.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "could not read error body".to_string());
        error!(%url, %status, %body, "request rejected by server");
        Err(ApiError::Status { status, body })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `GET /exercises` — the full catalog, ordered by name.
    pub async fn fetch_exercises(&self) -> Result<Vec<Exercise>, ApiError> {
        self.get_json("/exercises", &[]).await
    }

    /// `GET /sessions` — all sessions with nested sets, most recent first.
    pub async fn fetch_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.get_json("/sessions", &[]).await
    }

    /// `GET /exercises/latest-sets-by-name` — sets from the most recent
    /// session containing the exercise, ordered by set number.
    pub async fn fetch_latest_sets(&self, exercise_name: &str) -> Result<Vec<WorkoutSet>, ApiError> {
        self.get_json("/exercises/latest-sets-by-name", &[("name", exercise_name)])
            .await
    }

    /// `GET /sessions/latest-exercises-by-name` — distinct exercise names
    /// from the most recent session with the given name, in first-appearance
    /// order. Empty if no such session exists.
    pub async fn fetch_latest_session_exercises(
        &self,
        session_name: &str,
    ) -> Result<Vec<String>, ApiError> {
        self.get_json(
            "/sessions/latest-exercises-by-name",
            &[("name", session_name)],
        )
        .await
    }

    /// `POST /sessions` — creates a session atomically with all its sets.
    pub async fn create_session(&self, session: &SessionCreate) -> Result<Session, ApiError> {
        let url = self.url("/sessions");
        info!(%url, name = %session.name, sets = session.sets.len(), "posting session");
        let response = self.http.post(&url).json(session).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `GET /templates`
    pub async fn fetch_templates(&self) -> Result<Vec<Template>, ApiError> {
        self.get_json("/templates", &[]).await
    }

    /// `GET /templates/:id`
    pub async fn fetch_template(&self, id: i64) -> Result<Template, ApiError> {
        self.get_json(&format!("/templates/{id}"), &[]).await
    }

    /// `POST /templates`
    pub async fn create_template(&self, template: &TemplateCreate) -> Result<Template, ApiError> {
        let url = self.url("/templates");
        info!(%url, name = %template.name, "creating template");
        let response = self.http.post(&url).json(template).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `PUT /templates/:id` — full update.
    pub async fn update_template(
        &self,
        id: i64,
        template: &TemplateCreate,
    ) -> Result<Template, ApiError> {
        let url = self.url(&format!("/templates/{id}"));
        let response = self.http.put(&url).json(template).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `PATCH /templates/:id` — partial update.
    pub async fn patch_template(
        &self,
        id: i64,
        template: &TemplateCreate,
    ) -> Result<Template, ApiError> {
        let url = self.url(&format!("/templates/{id}"));
        let response = self.http.patch(&url).json(template).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// `DELETE /templates/:id`
    pub async fn delete_template(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/templates/{id}"));
        info!(%url, "deleting template");
        let response = self.http.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `POST /templates/:id/exercises?exercise_id=` — append an exercise.
    pub async fn add_template_exercise(
        &self,
        template_id: i64,
        exercise_id: i64,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/templates/{template_id}/exercises"));
        let response = self
            .http
            .post(&url)
            .query(&[("exercise_id", exercise_id.to_string())])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `DELETE /templates/:id/exercises/:exercise_id`
    pub async fn remove_template_exercise(
        &self,
        template_id: i64,
        exercise_id: i64,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/templates/{template_id}/exercises/{exercise_id}"));
        let response = self.http.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `PUT /templates/:id/exercises/sort` — body is the full ordered list of
    /// exercise ids.
    pub async fn reorder_template_exercises(
        &self,
        template_id: i64,
        exercise_ids: &[i64],
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/templates/{template_id}/exercises/sort"));
        let response = self.http.put(&url).json(&exercise_ids).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// `PATCH /exercises/:id/field-config` — persists which fields the UI
    /// shows for an exercise.
    pub async fn update_field_config(
        &self,
        exercise_id: i64,
        config: &FieldConfigUpdate,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/exercises/{exercise_id}/field-config"));
        let response = self.http.patch(&url).json(config).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
