//! # Web API Module
//!
//! Axum router over the services. Authentication is upstream: handlers take
//! the acting user from the `x-user-id` header.
//!
//! - [`routes`] - route table
//! - [`handlers`] - request handlers per resource
//! - [`middleware`] - request id, tracing, timeout, `x-cache` header
//! - [`state`] - shared application state
//! - [`response`] - error mapping and the cache-aware JSON response

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;
use std::time::Duration;

/// Create the Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.web.request_timeout_seconds);

    let router = Router::new()
        .merge(routes::health_routes())
        .merge(routes::api_routes());

    middleware::apply_middleware_stack(router, request_timeout).with_state(app_state)
}
