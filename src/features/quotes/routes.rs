use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::quotes::handlers;
use crate::features::quotes::services::QuoteService;

/// Public quote intake route
pub fn routes(service: Arc<QuoteService>) -> Router {
    Router::new()
        .route("/api/quotes", post(handlers::submit_quote))
        .with_state(service)
}

/// Admin quote routes, nested under /api/admin by the caller
pub fn admin_routes(service: Arc<QuoteService>) -> Router {
    Router::new()
        .route("/quotes", get(handlers::list_quotes_admin))
        .route("/quotes/{id}", patch(handlers::update_quote_status))
        .with_state(service)
}
