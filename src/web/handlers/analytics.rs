//! # Analytics Handlers

use axum::extract::{Query, State};

use crate::models::{DashboardAnalytics, DashboardParams};
use crate::web::extractors::AuthenticatedUser;
use crate::web::response::{ApiResult, CachedJson};
use crate::web::state::AppState;

/// Dashboard aggregates: GET /analytics/dashboard?from=..&to=..
pub async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<DashboardParams>,
) -> ApiResult<CachedJson<DashboardAnalytics>> {
    Ok(CachedJson(
        state
            .services
            .analytics
            .dashboard(&user.user_id, &params)
            .await?,
    ))
}
