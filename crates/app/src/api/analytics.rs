use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use services::UserAnalytics;

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::CurrentUser;

async fn get_analytics(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<UserAnalytics>> {
    let analytics = state.services.analytics().user_analytics(&user).await?;
    Ok(Json(analytics))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analytics", get(get_analytics))
}
