//! # Goal Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::{Goal, GoalListParams, GoalUpdate, NewGoal, Page};
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::{ApiResult, CachedJson};
use crate::web::state::AppState;

/// Body of `POST /goals/:id/reward`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachRewardRequest {
    pub reward_id: String,
}

/// List goals: GET /goals
pub async fn list_goals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<GoalListParams>,
) -> ApiResult<CachedJson<Page<Goal>>> {
    Ok(CachedJson(
        state.services.goals.list(&user.user_id, &params).await?,
    ))
}

/// Get one goal: GET /goals/:id
pub async fn get_goal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
) -> ApiResult<CachedJson<Goal>> {
    Ok(CachedJson(
        state.services.goals.get(&user.user_id, &goal_id).await?,
    ))
}

/// Create a goal: POST /goals
pub async fn create_goal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<NewGoal>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state.services.goals.create(&user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// Update a goal: PATCH /goals/:id
pub async fn update_goal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
    Json(update): Json<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .services
        .goals
        .update(&user.user_id, &goal_id, update)
        .await?;
    Ok(Json(goal))
}

/// Delete a goal and its subtasks: DELETE /goals/:id
pub async fn delete_goal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.services.goals.delete(&user.user_id, &goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link a reward: POST /goals/:id/reward
pub async fn attach_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
    Json(request): Json<AttachRewardRequest>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .services
        .goals
        .attach_reward(&user.user_id, &goal_id, &request.reward_id)
        .await?;
    Ok(Json(goal))
}

/// Unlink the reward: DELETE /goals/:id/reward
pub async fn detach_reward(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
) -> ApiResult<Json<Goal>> {
    let goal = state
        .services
        .goals
        .detach_reward(&user.user_id, &goal_id)
        .await?;
    Ok(Json(goal))
}
