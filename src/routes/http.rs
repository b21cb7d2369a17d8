//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{field, info, instrument, warn, Span};

use crate::domain::Rule;
use crate::error::{AssemblyError, StoreError};
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;
use crate::subjects::SubjectEntry;

/// Engine error carried out of a handler as a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub AssemblyError);

impl From<AssemblyError> for ApiError {
  fn from(e: AssemblyError) -> Self {
    Self(e)
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match &self.0 {
      AssemblyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AssemblyError::Infeasible { .. } => StatusCode::CONFLICT,
      AssemblyError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let details = match &self.0 {
      AssemblyError::Validation(errors) => errors.clone(),
      _ => Vec::new(),
    };
    let body = ErrorOut { error: self.0.kind(), message: self.0.to_string(), details };
    (status, Json(body)).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, questions: state.questions.len(), subjects: state.subjects.len() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_subjects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let subjects: Vec<SubjectEntry> = state.subjects.entries().cloned().collect();
  Json(SubjectsOut { subjects })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_inventory(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(question_inventory(&state))
}

/// Decode a rule body. Bodies that do not deserialize (bad JSON, wrong types, a negative
/// `totalScore`) come back as a structured validation error instead of axum's plain text.
fn read_rule(payload: Result<Json<Rule>, JsonRejection>) -> Result<Rule, ApiError> {
  match payload {
    Ok(Json(rule)) => {
      Span::current().record("title", rule.title.as_str());
      Ok(rule)
    }
    Err(rejection) => {
      warn!(target: "exam_backend", status = %rejection.status(), error = %rejection.body_text(), "HTTP rule body rejected");
      Err(ApiError(AssemblyError::Validation(vec![rejection.body_text()])))
    }
  }
}

#[instrument(level = "info", skip(state, payload), fields(title = field::Empty))]
pub async fn http_post_validate_rule(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<Rule>, JsonRejection>,
) -> Result<Json<ValidateOut>, ApiError> {
  let rule = read_rule(payload)?;
  let out = check_rule(&state, rule);
  info!(target: "exam_backend", valid = out.valid, errors = out.errors.len(), "HTTP rule validated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, payload), fields(title = field::Empty))]
pub async fn http_post_preview_paper(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<Rule>, JsonRejection>,
) -> Result<Json<PaperOut>, ApiError> {
  let rule = read_rule(payload)?;
  let generated = generate_paper(&state, rule, false).await.map_err(log_failure)?;
  info!(target: "exam_backend", origin = generated.origin, selected = generated.paper.question_ids.len(), "HTTP paper previewed");
  Ok(Json(PaperOut::from(generated)))
}

#[instrument(level = "info", skip(state, payload), fields(title = field::Empty))]
pub async fn http_post_paper(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<Rule>, JsonRejection>,
) -> Result<(StatusCode, Json<PaperOut>), ApiError> {
  let rule = read_rule(payload)?;
  let generated = generate_paper(&state, rule, true).await.map_err(log_failure)?;
  info!(
    target: "exam_backend",
    origin = generated.origin,
    paper_id = ?generated.paper.id,
    selected = generated.paper.question_ids.len(),
    "HTTP paper created"
  );
  Ok((StatusCode::CREATED, Json(PaperOut::from(generated))))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_paper(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<impl IntoResponse, ApiError> {
  let stored = find_paper(&state, &id)?;
  Ok(Json(stored))
}

fn log_failure(e: AssemblyError) -> ApiError {
  warn!(target: "exam_backend", kind = e.kind(), error = %e, "Paper generation failed");
  ApiError(e)
}
