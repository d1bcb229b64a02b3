//! # Web API Middleware
//!
//! Request ids, request tracing, the request timeout and the `x-cache`
//! header.

pub mod cache_status;
pub mod request_id;

use axum::middleware;
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::web::state::AppState;

/// Apply the middleware stack
///
/// Outermost first: request id, tracing, timeout, cache status.
pub fn apply_middleware_stack(router: Router<AppState>, request_timeout: Duration) -> Router<AppState> {
    router
        .layer(middleware::from_fn(cache_status::add_cache_status))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::add_request_id))
}
