use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::quotes::models::QuoteRequest;
use crate::shared::validation::{not_blank, EMAIL_REGEX};

/// Request DTO for the public quote form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitQuoteRequestDto {
    #[validate(custom(function = not_blank, message = "Name is required"))]
    pub name: String,

    #[validate(
        custom(function = not_blank, message = "Email is required"),
        regex(path = *EMAIL_REGEX, message = "Invalid email format")
    )]
    pub email: String,

    pub phone: Option<String>,

    #[validate(
        custom(function = not_blank, message = "Message is required"),
        length(max = 1000, message = "Message must not exceed 1000 characters")
    )]
    pub message: String,

    pub product_id: Option<Uuid>,
}

/// Request DTO updating the follow-up status of a quote request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuoteStatusDto {
    #[validate(custom(function = not_blank, message = "Status is required"))]
    pub status: String,
}

/// Response DTO for a quote request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuoteRequestResponseDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub product_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<QuoteRequest> for QuoteRequestResponseDto {
    fn from(q: QuoteRequest) -> Self {
        Self {
            id: q.id,
            email: q.email,
            name: q.name,
            phone: q.phone,
            message: q.message,
            product_id: q.product_id,
            status: q.status,
            created_at: q.created_at,
        }
    }
}
