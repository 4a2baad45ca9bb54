use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::stats::dtos::StatsDto;
use crate::features::stats::services::StatsService;
use crate::shared::types::ApiResponse;

/// Back office statistics
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Aggregate counters", body = ApiResponse<StatsDto>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn get_stats(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<StatsService>>,
) -> Result<Json<ApiResponse<StatsDto>>> {
    let stats = service.get_stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
