//! # Custom Axum Extractors

use crate::constants::headers::USER_ID;
use crate::web::response::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

/// The acting user, as established by the auth collaborator
///
/// Authentication happens upstream; by the time a request reaches this
/// service the user id arrives in the `x-user-id` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized)?
            .to_string();

        debug!(user_id = %user_id, "Extracted authenticated user");
        Ok(Self { user_id })
    }
}
