use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::changes::{ChangeFeed, ChangeKind, TrackedTable};
use crate::core::error::{AppError, Result};
use crate::features::quotes::dtos::{
    QuoteRequestResponseDto, SubmitQuoteRequestDto, UpdateQuoteStatusDto,
};
use crate::features::quotes::models::QuoteRequest;
use crate::shared::validation::{sanitize_optional, sanitize_text};

const QUOTE_COLUMNS: &str = r#"
    id, email, name, phone, message, product_id, status, created_at
"#;

/// Service for quote requests. Same intake pattern as leads but with a
/// follow-up status instead of the notification pipeline.
pub struct QuoteService {
    pool: PgPool,
    changes: Arc<ChangeFeed>,
}

impl QuoteService {
    pub fn new(pool: PgPool, changes: Arc<ChangeFeed>) -> Self {
        Self { pool, changes }
    }

    /// Store a public quote form submission with status `pending`
    pub async fn submit(&self, dto: SubmitQuoteRequestDto) -> Result<QuoteRequestResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO quote_requests (email, name, phone, message, product_id, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        let quote = sqlx::query_as::<_, QuoteRequest>(&sql)
            .bind(sanitize_text(&dto.email))
            .bind(sanitize_text(&dto.name))
            .bind(sanitize_optional(dto.phone.as_deref()))
            .bind(sanitize_text(&dto.message))
            .bind(dto.product_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert quote request: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Quote request created: id={}", quote.id);
        self.changes
            .publish(TrackedTable::QuoteRequests, ChangeKind::Insert, quote.id);

        Ok(quote.into())
    }

    /// Admin view: every quote request, newest-first
    pub async fn list(&self) -> Result<Vec<QuoteRequestResponseDto>> {
        let sql = format!(
            r#"
            SELECT {QUOTE_COLUMNS}
            FROM quote_requests
            ORDER BY created_at DESC
            "#
        );

        let quotes = sqlx::query_as::<_, QuoteRequest>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list quote requests: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(quotes.into_iter().map(|q| q.into()).collect())
    }

    /// Update the follow-up status of a quote request
    pub async fn update_status(
        &self,
        id: Uuid,
        dto: UpdateQuoteStatusDto,
    ) -> Result<QuoteRequestResponseDto> {
        let sql = format!(
            r#"
            UPDATE quote_requests
            SET status = $1
            WHERE id = $2
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        let quote = sqlx::query_as::<_, QuoteRequest>(&sql)
            .bind(dto.status.trim())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update quote request: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Quote request not found".to_string()))?;

        self.changes
            .publish(TrackedTable::QuoteRequests, ChangeKind::Update, quote.id);

        Ok(quote.into())
    }
}
