use std::sync::Arc;

use axum::{routing::get, Router};

use crate::core::changes::ChangeFeed;
use crate::features::changes::handlers;

/// Change stream route, nested under /api/admin by the caller
pub fn admin_routes(feed: Arc<ChangeFeed>) -> Router {
    Router::new()
        .route("/changes", get(handlers::stream_changes))
        .with_state(feed)
}
