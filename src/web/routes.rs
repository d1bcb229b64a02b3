//! # Web API Route Definitions

use crate::web::handlers;
use crate::web::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;

/// Goal, subtask, reward, user and analytics routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Goals
        .route(
            "/goals",
            get(handlers::goals::list_goals).post(handlers::goals::create_goal),
        )
        .route(
            "/goals/:id",
            get(handlers::goals::get_goal)
                .patch(handlers::goals::update_goal)
                .delete(handlers::goals::delete_goal),
        )
        .route(
            "/goals/:id/reward",
            post(handlers::goals::attach_reward).delete(handlers::goals::detach_reward),
        )
        // Subtasks
        .route(
            "/goals/:id/subtasks",
            get(handlers::subtasks::list_subtasks).post(handlers::subtasks::create_subtask),
        )
        .route(
            "/subtasks/:id",
            get(handlers::subtasks::get_subtask)
                .patch(handlers::subtasks::update_subtask)
                .delete(handlers::subtasks::delete_subtask),
        )
        // Rewards
        .route(
            "/rewards",
            get(handlers::rewards::list_rewards).post(handlers::rewards::create_reward),
        )
        .route(
            "/rewards/:id",
            get(handlers::rewards::get_reward)
                .patch(handlers::rewards::update_reward)
                .delete(handlers::rewards::delete_reward),
        )
        .route("/rewards/:id/claim", post(handlers::rewards::claim_reward))
        // Users
        .route("/users", post(handlers::users::register))
        .route(
            "/users/me",
            get(handlers::users::get_profile).patch(handlers::users::update_profile),
        )
        .route("/users/me/password", put(handlers::users::change_password))
        // Analytics
        .route(
            "/analytics/dashboard",
            get(handlers::analytics::get_dashboard),
        )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
