use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Aggregate counts behind `/api/dashboard-stats`
pub fn routes(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard-stats", get(handlers::get_stats))
        .with_state(service)
}
