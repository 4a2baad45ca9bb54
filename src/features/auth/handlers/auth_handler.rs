use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{AdminDto, LoginRequestDto, LoginResponseDto};
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

/// Sign in to the back office
///
/// Issues a session token when the account exists in admin_users and the
/// password matches. Any other outcome gets the same generic 401.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<LoginResponseDto>),
        (status = 401, description = "Unknown account, wrong password or non-admin")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.sign_in(dto).await?;

    Ok(Json(ApiResponse::success(
        Some(response),
        Some("Connexion réussie".to_string()),
        None,
    )))
}

/// Current admin identity
///
/// The console calls this on load to re-check the admin gate.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated admin", body = ApiResponse<AdminDto>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_me(admin: AuthenticatedAdmin) -> Result<Json<ApiResponse<AdminDto>>> {
    Ok(Json(ApiResponse::success(
        Some(AdminDto {
            id: admin.admin_id,
            email: admin.email,
        }),
        None,
        None,
    )))
}
