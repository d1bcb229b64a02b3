//! # Subtask Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{NewSubtask, Page, Subtask, SubtaskListParams, SubtaskUpdate};
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::{ApiResult, CachedJson};
use crate::web::state::AppState;

/// List a goal's subtasks: GET /goals/:id/subtasks
pub async fn list_subtasks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
    Query(params): Query<SubtaskListParams>,
) -> ApiResult<CachedJson<Page<Subtask>>> {
    Ok(CachedJson(
        state
            .services
            .subtasks
            .list(&user.user_id, &goal_id, &params)
            .await?,
    ))
}

/// Create a subtask: POST /goals/:id/subtasks
pub async fn create_subtask(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(goal_id): Path<String>,
    Json(input): Json<NewSubtask>,
) -> ApiResult<(StatusCode, Json<Subtask>)> {
    let subtask = state
        .services
        .subtasks
        .create(&user.user_id, &goal_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

/// GET /subtasks/:id
pub async fn get_subtask(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(subtask_id): Path<String>,
) -> ApiResult<CachedJson<Subtask>> {
    Ok(CachedJson(
        state.services.subtasks.get(&user.user_id, &subtask_id).await?,
    ))
}

/// PATCH /subtasks/:id
pub async fn update_subtask(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(subtask_id): Path<String>,
    Json(update): Json<SubtaskUpdate>,
) -> ApiResult<Json<Subtask>> {
    let subtask = state
        .services
        .subtasks
        .update(&user.user_id, &subtask_id, update)
        .await?;
    Ok(Json(subtask))
}

/// DELETE /subtasks/:id
pub async fn delete_subtask(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(subtask_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .services
        .subtasks
        .delete(&user.user_id, &subtask_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
