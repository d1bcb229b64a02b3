//! # User Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::{NewUser, ProfileUpdate, UserProfile};
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::{ApiResult, CachedJson};
use crate::web::state::AppState;

/// Body of `PUT /users/me/password`; the hash comes from the auth collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub password_hash: String,
}

/// Register: POST /users
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = state.services.users.register(input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /users/me
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<CachedJson<UserProfile>> {
    Ok(CachedJson(state.services.users.profile(&user.user_id).await?))
}

/// PATCH /users/me
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state
        .services
        .users
        .update_profile(&user.user_id, update)
        .await?;
    Ok(Json(profile))
}

/// PUT /users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .services
        .users
        .change_password(&user.user_id, request.password_hash)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
