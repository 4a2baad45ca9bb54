use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for an admin account
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Admin identity attached to authenticated requests
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedAdmin {
    pub admin_id: Uuid,
    pub email: String,
}

/// Claims carried by an admin session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Admin account id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}
