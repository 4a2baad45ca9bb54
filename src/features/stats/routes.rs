use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::stats::handlers;
use crate::features::stats::services::StatsService;

/// Statistics route, nested under /api/admin by the caller
pub fn admin_routes(service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/stats", get(handlers::get_stats))
        .with_state(service)
}
