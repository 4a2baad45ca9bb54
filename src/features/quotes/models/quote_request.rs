use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a quote request
#[derive(Debug, Clone, FromRow)]
pub struct QuoteRequest {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub product_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
