use std::sync::Arc;

use axum::Router;

use crate::AppState;

pub mod analytics;
pub mod goals;
pub mod health;
pub mod sessions;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(goals::router())
        .merge(sessions::router())
        .merge(analytics::router())
}
