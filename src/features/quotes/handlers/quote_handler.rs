use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::quotes::dtos::{
    QuoteRequestResponseDto, SubmitQuoteRequestDto, UpdateQuoteStatusDto,
};
use crate::features::quotes::services::QuoteService;
use crate::shared::types::ApiResponse;

/// Submit a quote request from the public site
#[utoipa::path(
    post,
    path = "/api/quotes",
    request_body = SubmitQuoteRequestDto,
    responses(
        (status = 201, description = "Quote request stored", body = ApiResponse<QuoteRequestResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "quotes"
)]
pub async fn submit_quote(
    State(service): State<Arc<QuoteService>>,
    AppJson(dto): AppJson<SubmitQuoteRequestDto>,
) -> Result<(axum::http::StatusCode, Json<ApiResponse<QuoteRequestResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let quote = service.submit(dto).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(quote),
            Some("Votre demande de devis a bien été envoyée".to_string()),
            None,
        )),
    ))
}

/// Admin quote requests view
#[utoipa::path(
    get,
    path = "/api/admin/quotes",
    responses(
        (status = 200, description = "Quote requests", body = ApiResponse<Vec<QuoteRequestResponseDto>>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_quotes_admin(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<QuoteService>>,
) -> Result<Json<ApiResponse<Vec<QuoteRequestResponseDto>>>> {
    let quotes = service.list().await?;
    Ok(Json(ApiResponse::success(Some(quotes), None, None)))
}

/// Update the follow-up status of a quote request
#[utoipa::path(
    patch,
    path = "/api/admin/quotes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quote request ID")
    ),
    request_body = UpdateQuoteStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<QuoteRequestResponseDto>),
        (status = 404, description = "Quote request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn update_quote_status(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<QuoteService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateQuoteStatusDto>,
) -> Result<Json<ApiResponse<QuoteRequestResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let quote = service.update_status(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(quote), None, None)))
}
