use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::changes::{ChangeFeed, ChangeKind, TrackedTable};
use crate::core::error::{AppError, Result};
use crate::features::leads::dtos::{AdminLeadsDto, LeadListQuery, LeadResponseDto, SubmitLeadDto};
use crate::features::leads::filter;
use crate::features::leads::models::{Lead, LeadType};
use crate::shared::validation::{sanitize_optional, sanitize_text};

const LEAD_COLUMNS: &str = r#"
    id, email, name, phone, company_name, message, type, product_id, sent, created_at
"#;

/// Service for lead intake and the admin leads view
pub struct LeadService {
    pool: PgPool,
    changes: Arc<ChangeFeed>,
}

impl LeadService {
    pub fn new(pool: PgPool, changes: Arc<ChangeFeed>) -> Self {
        Self { pool, changes }
    }

    /// Store a public form submission as a lead with `sent = false`.
    ///
    /// Text fields arrive validated by the handler and are sanitized here
    /// before storage. A generic inquiry opened from a product page gets
    /// the product name prefixed to its message so the back office sees
    /// the context at a glance.
    pub async fn submit(&self, dto: SubmitLeadDto) -> Result<LeadResponseDto> {
        let name = sanitize_text(&dto.name);
        let email = sanitize_text(&dto.email);
        let phone = sanitize_optional(dto.phone.as_deref());
        let company = sanitize_optional(dto.company.as_deref());
        let mut message = sanitize_text(&dto.message);

        if let Some(product_id) = dto.product_id {
            let product_name = sqlx::query_scalar::<_, String>(
                r#"SELECT name FROM products WHERE id = $1"#,
            )
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up product for lead: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::BadRequest("Unknown product".to_string()))?;

            if dto.lead_type == LeadType::Demande {
                message = format!("Demande {} : {}", product_name, message);
            }
        }

        let sql = format!(
            r#"
            INSERT INTO leads (email, name, phone, company_name, message, type, product_id, sent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(&email)
            .bind(&name)
            .bind(&phone)
            .bind(&company)
            .bind(&message)
            .bind(dto.lead_type.as_str())
            .bind(dto.product_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert lead: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Lead created: id={}, type={}", lead.id, lead.lead_type);
        self.changes
            .publish(TrackedTable::Leads, ChangeKind::Insert, lead.id);

        Ok(lead.into())
    }

    /// Admin leads view: every lead newest-first, filtered in memory,
    /// plus the aggregate counters.
    pub async fn list_admin(&self, query: &LeadListQuery) -> Result<AdminLeadsDto> {
        let leads = self.load_all().await?;

        let filtered = filter::apply(&leads, query, Utc::now());
        let counts = filter::counts(&leads, filtered.len());

        Ok(AdminLeadsDto {
            leads: filtered.into_iter().map(|l| l.into()).collect(),
            counts,
        })
    }

    /// Fetch a single lead (manual notification trigger)
    pub async fn get(&self, id: Uuid) -> Result<Lead> {
        let sql = format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            WHERE id = $1
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch lead: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
    }

    async fn load_all(&self) -> Result<Vec<Lead>> {
        let sql = format!(
            r#"
            SELECT {LEAD_COLUMNS}
            FROM leads
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, Lead>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list leads: {:?}", e);
                AppError::Database(e)
            })
    }
}
