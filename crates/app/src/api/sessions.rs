use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use services::{CompletedSession, NewSession};
use study_core::model::{SessionId, StudySession};

use crate::AppState;
use crate::api::goals::ListQuery;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};

pub const DEFAULT_SESSION_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub correct: bool,
}

fn parse_session_id(raw: &str) -> ApiResult<SessionId> {
    raw.parse().map_err(|_| ApiError::NotFound("session"))
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<StudySession>>> {
    let limit = query.limit.unwrap_or(DEFAULT_SESSION_LIMIT);
    let sessions = state.services.sessions().list_sessions(&user, limit).await?;
    Ok(Json(sessions))
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<NewSession>,
) -> ApiResult<(StatusCode, Json<StudySession>)> {
    let session = state
        .services
        .sessions()
        .start_session(&user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<StudySession>> {
    let id = parse_session_id(&id)?;
    state
        .services
        .sessions()
        .get_session(id, &user)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("session"))
}

async fn record_answer(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(answer): ApiJson<AnswerRequest>,
) -> ApiResult<Json<StudySession>> {
    let id = parse_session_id(&id)?;
    state
        .services
        .sessions()
        .record_answer(id, &user, answer.correct)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("session"))
}

async fn complete_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CompletedSession>> {
    let id = parse_session_id(&id)?;
    state
        .services
        .sessions()
        .complete_session(id, &user)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("session"))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(list_sessions).post(start_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/answers", post(record_answer))
        .route("/sessions/{id}/complete", post(complete_session))
}
