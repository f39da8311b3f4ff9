use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::http::request::Parts;
use study_core::model::UserId;

use crate::error::ApiError;

/// Header carrying the caller's identity. Authentication happens upstream.
pub const USER_HEADER: &str = "x-user-id";

/// The user a request acts for.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingUser)?;
        UserId::new(raw)
            .map(CurrentUser)
            .map_err(|_| ApiError::MissingUser)
    }
}

/// `Json` with rejections rendered as API errors.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` with rejections rendered as API errors.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
