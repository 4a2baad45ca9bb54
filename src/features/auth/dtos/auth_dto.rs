use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request DTO for admin sign-in
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for a successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the session token expires
    pub expires_in: i64,
    pub admin: AdminDto,
}

/// Public representation of an admin account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDto {
    pub id: Uuid,
    pub email: String,
}
