use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::dashboard::dtos::DashboardStatsDto;
use crate::features::dashboard::services::DashboardService;

/// Get record counts for the dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard-stats",
    responses(
        (status = 200, description = "Current counts", body = DashboardStatsDto),
    ),
    tag = "dashboard"
)]
pub async fn get_stats(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<DashboardStatsDto>> {
    Ok(Json(service.stats().await?))
}
