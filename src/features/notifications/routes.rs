use axum::{
    routing::{options, post},
    Router,
};

use crate::features::notifications::handlers::{self, NotificationState};

/// The notification function endpoint.
///
/// Mounted outside the session middleware: the handler checks the bearer
/// credential itself, and the OPTIONS preflight must stay open.
pub fn function_routes(state: NotificationState) -> Router {
    Router::new()
        .route(
            "/functions/send-tech-sheet",
            options(handlers::preflight).post(handlers::send_tech_sheet),
        )
        .with_state(state)
}

/// Manual trigger, nested under /api/admin by the caller
pub fn admin_routes(state: NotificationState) -> Router {
    Router::new()
        .route("/leads/{id}/notify", post(handlers::notify_lead))
        .with_state(state)
}
