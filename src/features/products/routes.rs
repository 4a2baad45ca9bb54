use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

/// Public catalog routes (no authentication required)
pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/{id}", get(handlers::get_product))
        .route(
            "/api/products/{id}/compatible",
            get(handlers::list_compatible),
        )
        .with_state(service)
}

/// Admin catalog routes, nested under /api/admin by the caller
pub fn admin_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products_admin).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            put(handlers::update_product).delete(handlers::delete_product),
        )
        .route(
            "/products/{id}/compatibilities",
            put(handlers::set_compatibilities),
        )
        .with_state(service)
}
