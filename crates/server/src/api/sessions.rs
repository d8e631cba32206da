//! Narrowing session API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use petdiag_core::{Answer, NarrowingSession, SessionError, SessionSnapshot, Species};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for choosing the species
#[derive(Debug, Deserialize)]
pub struct SpeciesBody {
    pub species: Species,
}

/// Request body for submitting symptoms, either as tags or as
/// comma-separated text.
#[derive(Debug, Deserialize)]
pub struct SymptomsBody {
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Request body for answering the current question.
/// `null` or a missing field means "don't know".
#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    #[serde(default)]
    pub answer: Option<bool>,
}

/// Request body naming a candidate by its catalog position
#[derive(Debug, Deserialize)]
pub struct CandidateBody {
    pub position: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct SessionErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<SessionErrorResponse>);

type SessionResult = Result<Json<SessionSnapshot>, ApiError>;

fn error_response(status: StatusCode, error: String) -> ApiError {
    (status, Json(SessionErrorResponse { error }))
}

fn not_found(id: &str) -> ApiError {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session not found: {}", id),
    )
}

fn refused(id: &str, err: SessionError) -> ApiError {
    warn!(session_id = %id, error = %err, "Refused session operation");
    let status = match err {
        SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SessionError::EmptySymptoms | SessionError::UnknownCandidate(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    error_response(status, err.to_string())
}

/// Run `op` against a stored session and return its updated view.
async fn apply<F>(state: &AppState, id: &str, op: F) -> SessionResult
where
    F: FnOnce(&mut NarrowingSession) -> Result<(), SessionError>,
{
    let mut sessions = state.sessions().write().await;
    let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
    op(session).map_err(|e| refused(id, e))?;
    Ok(Json(session.snapshot()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    match state.create_session().await {
        Ok(snapshot) => Ok((StatusCode::CREATED, Json(snapshot))),
        Err(e) => {
            warn!(error = %e, "Refusing new session");
            Err(error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
    }
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> SessionResult {
    let sessions = state.sessions().read().await;
    sessions
        .get(&id)
        .map(|session| Json(session.snapshot()))
        .ok_or_else(|| not_found(&id))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

/// POST /api/v1/sessions/{id}/species
pub async fn select_species(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SpeciesBody>,
) -> SessionResult {
    apply(&state, &id, |s| s.select_species(body.species).map(|_| ())).await
}

/// POST /api/v1/sessions/{id}/symptoms
pub async fn submit_symptoms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SymptomsBody>,
) -> SessionResult {
    apply(&state, &id, |s| {
        let submitted = match (body.symptoms, body.text) {
            (Some(symptoms), _) => s.submit_symptoms(symptoms),
            (None, Some(text)) => s.submit_symptom_text(&text),
            (None, None) => Err(SessionError::EmptySymptoms),
        };
        submitted.map(|_| ())
    })
    .await
}

/// POST /api/v1/sessions/{id}/answer
pub async fn answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AnswerBody>,
) -> SessionResult {
    let answer = Answer::from(body.answer);
    apply(&state, &id, |s| s.answer(answer).map(|_| ())).await
}

/// POST /api/v1/sessions/{id}/pick
///
/// Pick a listed candidate while narrowing, or one of the manual choices
/// on a result.
pub async fn pick(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CandidateBody>,
) -> SessionResult {
    apply(&state, &id, |s| s.pick(body.position).map(|_| ())).await
}

/// POST /api/v1/sessions/{id}/image/select
pub async fn select_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<CandidateBody>,
) -> SessionResult {
    apply(&state, &id, |s| {
        s.select_image_candidate(body.position).map(|_| ())
    })
    .await
}

/// POST /api/v1/sessions/{id}/image/skip
pub async fn skip_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> SessionResult {
    apply(&state, &id, |s| s.skip_image().map(|_| ())).await
}

/// POST /api/v1/sessions/{id}/back
pub async fn back(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> SessionResult {
    apply(&state, &id, |s| s.back().map(|_| ())).await
}

/// POST /api/v1/sessions/{id}/reset
pub async fn reset(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> SessionResult {
    apply(&state, &id, |s| s.reset().map(|_| ())).await
}
