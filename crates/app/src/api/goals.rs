use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use services::{DEFAULT_GOAL_LIMIT, GoalList, ProgressRefresh};
use study_core::model::{ExamScope, Goal, GoalDraft, GoalId, GoalUpdate};
use study_core::progress::ProgressReport;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery, CurrentUser};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

// Malformed ids cannot name an existing goal.
fn parse_goal_id(raw: &str) -> ApiResult<GoalId> {
    raw.parse().map_err(|_| ApiError::NotFound("goal"))
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<GoalList>> {
    let limit = query.limit.unwrap_or(DEFAULT_GOAL_LIMIT);
    let list = state.services.goals().list_goals(&user, limit).await?;
    Ok(Json(list))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(draft): ApiJson<GoalDraft>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state.services.goals().create_goal(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Goal>> {
    let id = parse_goal_id(&id)?;
    state
        .services
        .goals()
        .get_goal(id, &user)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("goal"))
}

async fn update_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let id = parse_goal_id(&id)?;
    state
        .services
        .goals()
        .update_goal(id, &user, update)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("goal"))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_goal_id(&id)?;
    if state.services.goals().delete_goal(id, &user).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("goal"))
    }
}

async fn get_goal_progress(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressReport>> {
    let id = parse_goal_id(&id)?;
    state
        .services
        .goals()
        .get_goal_progress(id, &user)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("goal"))
}

async fn refresh_goals(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(scope): ApiJson<ExamScope>,
) -> ApiResult<Json<ProgressRefresh>> {
    let refresh = state
        .services
        .goals()
        .update_goal_progress(&user, &scope)
        .await?;
    Ok(Json(refresh))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/refresh", post(refresh_goals))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/goals/{id}/progress", get(get_goal_progress))
}
