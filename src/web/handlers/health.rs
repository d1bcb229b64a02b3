//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::cache::ConnectionState;
use crate::web::state::AppState;

/// Health response
///
/// The service is up whenever it answers; a degraded cache is reported but
/// does not make the service unhealthy.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub cache: CacheHealth,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub provider: &'static str,
    pub enabled: bool,
    pub connection_state: Option<ConnectionState>,
    pub healthy: bool,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.cache.health_check().await;
    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        timestamp: chrono::Utc::now().to_rfc3339(),
        cache: CacheHealth {
            provider: state.cache.provider_name(),
            enabled: state.cache.is_enabled(),
            connection_state: state.cache.connection_state(),
            healthy,
        },
    })
}
