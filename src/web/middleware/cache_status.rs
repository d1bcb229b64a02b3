//! # Cache Status Middleware
//!
//! Turns the [`CacheStatus`] a read handler left in the response extensions
//! into an `x-cache: HIT|MISS` header. Responses without one pass through
//! untouched. Informational only.

use crate::cache::CacheStatus;
use crate::constants::headers::CACHE_STATUS;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

pub async fn add_cache_status(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Some(status) = response.extensions().get::<CacheStatus>().copied() {
        response
            .headers_mut()
            .insert(CACHE_STATUS, HeaderValue::from_static(status.as_str()));
    }
    response
}
