use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;

/// Public auth routes (sign-in)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .with_state(service)
}

/// Routes behind the session middleware
pub fn protected_routes() -> Router {
    Router::new().route("/api/auth/me", get(handlers::get_me))
}
