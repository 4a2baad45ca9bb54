use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::leads::handlers;
use crate::features::leads::services::LeadService;

/// Public lead intake route
pub fn routes(service: Arc<LeadService>) -> Router {
    Router::new()
        .route("/api/leads", post(handlers::submit_lead))
        .with_state(service)
}

/// Admin leads view, nested under /api/admin by the caller
pub fn admin_routes(service: Arc<LeadService>) -> Router {
    Router::new()
        .route("/leads", get(handlers::list_leads_admin))
        .with_state(service)
}
