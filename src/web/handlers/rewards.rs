//! # Reward Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{NewReward, Page, Reward, RewardListParams, RewardUpdate};
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::{ApiResult, CachedJson};
use crate::web::state::AppState;

/// GET /rewards
pub async fn list_rewards(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<RewardListParams>,
) -> ApiResult<CachedJson<Page<Reward>>> {
    Ok(CachedJson(
        state.services.rewards.list(&user.user_id, &params).await?,
    ))
}

/// GET /rewards/:id
pub async fn get_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reward_id): Path<String>,
) -> ApiResult<CachedJson<Reward>> {
    Ok(CachedJson(
        state.services.rewards.get(&user.user_id, &reward_id).await?,
    ))
}

/// POST /rewards
pub async fn create_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewReward>,
) -> ApiResult<(StatusCode, Json<Reward>)> {
    let reward = state.services.rewards.create(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(reward)))
}

/// PATCH /rewards/:id
pub async fn update_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reward_id): Path<String>,
    Json(update): Json<RewardUpdate>,
) -> ApiResult<Json<Reward>> {
    let reward = state
        .services
        .rewards
        .update(&user.user_id, &reward_id, update)
        .await?;
    Ok(Json(reward))
}

/// DELETE /rewards/:id
pub async fn delete_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reward_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .services
        .rewards
        .delete(&user.user_id, &reward_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Claim a reward: POST /rewards/:id/claim
pub async fn claim_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reward_id): Path<String>,
) -> ApiResult<Json<Reward>> {
    let reward = state
        .services
        .rewards
        .claim(&user.user_id, &reward_id)
        .await?;
    Ok(Json(reward))
}
