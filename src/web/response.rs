//! # Web API Error and Response Types
//!
//! `ApiError` maps service errors to HTTP status codes with a JSON body.
//! `CachedJson` carries the cache status of a read to the `cache_status`
//! middleware through response extensions.

use crate::cache::{CacheStatus, Cached};
use crate::error::GoaltrackError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    #[error("Internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code) = self.status_and_code();
        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string()
            }
        });
        (status_code, Json(body)).into_response()
    }
}

impl From<GoaltrackError> for ApiError {
    fn from(err: GoaltrackError) -> Self {
        match err {
            GoaltrackError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            GoaltrackError::Validation(message) => ApiError::BadRequest(message),
            GoaltrackError::Forbidden(message) => ApiError::Forbidden(message),
            GoaltrackError::Conflict(message) => ApiError::Conflict(message),
            GoaltrackError::Store(store) => match store {
                StoreError::NotFound { .. } => ApiError::NotFound(store.to_string()),
                StoreError::Conflict { .. } => ApiError::Conflict(store.to_string()),
                StoreError::Unavailable(reason) => {
                    tracing::error!(reason = %reason, "Store unavailable");
                    ApiError::ServiceUnavailable
                }
            },
            GoaltrackError::Configuration(e) => {
                tracing::error!(error = %e, "Configuration error while serving request");
                ApiError::Internal
            }
        }
    }
}

/// JSON body plus the cache status of the read that produced it
#[derive(Debug)]
pub struct CachedJson<T>(pub Cached<T>);

impl<T: Serialize> IntoResponse for CachedJson<T> {
    fn into_response(self) -> Response {
        let Cached { value, status } = self.0;
        let mut response = Json(value).into_response();
        response.extensions_mut().insert::<CacheStatus>(status);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (GoaltrackError::not_found("goal", "g1"), StatusCode::NOT_FOUND),
            (GoaltrackError::validation("bad"), StatusCode::BAD_REQUEST),
            (GoaltrackError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (GoaltrackError::Conflict("twice".into()), StatusCode::CONFLICT),
            (
                GoaltrackError::Store(StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_cached_json_sets_extension() {
        let response = CachedJson(Cached::hit(vec![1])).into_response();
        assert_eq!(
            response.extensions().get::<CacheStatus>(),
            Some(&CacheStatus::Hit)
        );
    }
}
