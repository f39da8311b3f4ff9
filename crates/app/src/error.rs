use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use services::{AnalyticsError, GoalServiceError, SessionServiceError};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("missing or empty x-user-id header")]
    MissingUser,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Goals(#[from] GoalServiceError),

    #[error(transparent)]
    Sessions(#[from] SessionServiceError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUser => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Goals(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Sessions(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Goals(_) | ApiError::Sessions(_) | ApiError::Analytics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::StorageError;
    use study_core::model::GoalError;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::MissingUser.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("goal").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(GoalServiceError::from(GoalError::EmptyTitle)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GoalServiceError::from(StorageError::Connection("db".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(ApiError::NotFound("session").to_string(), "session not found");
    }
}
