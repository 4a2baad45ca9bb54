use std::sync::Arc;

use axum::http::HeaderMap;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::changes::{ChangeFeed, ChangeKind, TrackedTable};
use crate::core::error::{AppError, Result};
use crate::features::leads::models::LeadType;
use crate::features::notifications::dtos::LeadRecord;
use crate::features::notifications::services::{AuditEntry, SecurityAuditService};
use crate::features::notifications::templates;
use crate::modules::mailer::{EmailSender, OutgoingEmail};
use crate::shared::constants::AUDIT_ACTION_SEND_TECH_SHEET;

/// Network metadata and actor identity of a notification invocation
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub admin_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Context for runs triggered by the in-process change feed
    pub fn internal() -> Self {
        Self {
            admin_id: None,
            ip_address: Some("internal".to_string()),
            user_agent: None,
        }
    }

    /// Context for HTTP invocations
    pub fn from_headers(headers: &HeaderMap, admin_id: Option<Uuid>) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .or_else(|| headers.get("x-real-ip"))
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or(s).trim().to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Self {
            admin_id,
            ip_address,
            user_agent,
        }
    }
}

/// Why a notification run ended as a no-op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The lead is not a technical-datasheet request
    NotTechSheetRequest,
    /// The lead carries no product reference
    NoProduct,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::NotTechSheetRequest => "Not a tech sheet request",
            SkipReason::NoProduct => "No product specified",
        }
    }
}

/// Outcome of a notification run
#[derive(Debug, Clone)]
pub enum NotificationOutcome {
    /// The email went out; `sent` was flagged (or at least attempted)
    Sent { email_id: Option<String> },
    /// Intentional no-op, not an error
    Skipped(SkipReason),
}

/// Notifications are only sent for datasheet requests tied to a product
pub fn skip_reason(record: &LeadRecord) -> Option<SkipReason> {
    if record.lead_type != LeadType::Fiche.as_str() {
        return Some(SkipReason::NotTechSheetRequest);
    }
    if record.product_id.is_none() {
        return Some(SkipReason::NoProduct);
    }
    None
}

#[derive(Debug, FromRow)]
struct ProductSheet {
    name: String,
    datasheet_url: Option<String>,
}

/// The lead notification pipeline: audit, filter, product lookup, email
/// dispatch, sent-flag bookkeeping.
pub struct NotificationService {
    pool: PgPool,
    mailer: Arc<dyn EmailSender>,
    audit: Arc<SecurityAuditService>,
    changes: Arc<ChangeFeed>,
}

impl NotificationService {
    pub fn new(
        pool: PgPool,
        mailer: Arc<dyn EmailSender>,
        audit: Arc<SecurityAuditService>,
        changes: Arc<ChangeFeed>,
    ) -> Self {
        Self {
            pool,
            mailer,
            audit,
            changes,
        }
    }

    /// Run the pipeline for one lead.
    ///
    /// The email is the primary contract: once it has gone out the call
    /// reports success even if the sent-flag update fails (the mismatch is
    /// logged for manual follow-up).
    pub async fn send_tech_sheet(
        &self,
        record: &LeadRecord,
        ctx: &RequestContext,
    ) -> Result<NotificationOutcome> {
        // Audit first, best-effort
        self.audit
            .record(AuditEntry {
                action: AUDIT_ACTION_SEND_TECH_SHEET,
                table_name: "leads",
                record_id: Some(record.id),
                admin_id: ctx.admin_id,
                ip_address: ctx.ip_address.as_deref(),
                user_agent: ctx.user_agent.as_deref(),
            })
            .await;

        if let Some(reason) = skip_reason(record) {
            tracing::info!(
                "Skipping notification for lead {}: {}",
                record.id,
                reason.message()
            );
            return Ok(NotificationOutcome::Skipped(reason));
        }

        // skip_reason() guarantees the product reference is present
        let product_id = record
            .product_id
            .ok_or_else(|| AppError::Internal("Lead lost its product reference".to_string()))?;

        let product = sqlx::query_as::<_, ProductSheet>(
            r#"SELECT name, datasheet_url FROM products WHERE id = $1"#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch product for notification: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let content = templates::tech_sheet_email(
            record.name.as_deref(),
            &product.name,
            product.datasheet_url.as_deref(),
        )?;

        let receipt = self
            .mailer
            .send(&OutgoingEmail {
                to: record.email.clone(),
                subject: content.subject,
                html: content.html,
            })
            .await?;

        self.mark_sent(record.id).await;

        Ok(NotificationOutcome::Sent {
            email_id: receipt.email_id,
        })
    }

    /// Flag the lead as notified. Only ever flips false -> true; a failure
    /// here does not undo the dispatched email, so it is logged and
    /// swallowed.
    async fn mark_sent(&self, lead_id: Uuid) {
        let result = sqlx::query(r#"UPDATE leads SET sent = TRUE WHERE id = $1"#)
            .bind(lead_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                tracing::warn!(
                    "Email dispatched but lead {} was not found to flag as sent",
                    lead_id
                );
            }
            Ok(_) => {
                self.changes
                    .publish(TrackedTable::Leads, ChangeKind::Update, lead_id);
            }
            Err(e) => {
                tracing::error!(
                    "Email dispatched but flagging lead {} as sent failed: {:?}",
                    lead_id,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::modules::mailer::SendReceipt;
    use crate::shared::constants::CHANGE_FEED_CAPACITY;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl RecordingMailer {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EmailSender for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<SendReceipt> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(SendReceipt {
                email_id: Some("test-email-id".to_string()),
            })
        }
    }

    fn record(lead_type: &str, product_id: Option<Uuid>) -> LeadRecord {
        LeadRecord {
            id: Uuid::new_v4(),
            email: "jean@example.com".to_string(),
            name: Some("Jean".to_string()),
            lead_type: lead_type.to_string(),
            product_id,
        }
    }

    fn service_with_mailer(mailer: Arc<RecordingMailer>) -> NotificationService {
        let pool = crate::core::database::lazy_test_pool();
        NotificationService::new(
            pool.clone(),
            mailer,
            Arc::new(SecurityAuditService::new(pool)),
            Arc::new(ChangeFeed::new(CHANGE_FEED_CAPACITY)),
        )
    }

    #[test]
    fn skips_leads_that_are_not_datasheet_requests() {
        assert_eq!(
            skip_reason(&record("devis", Some(Uuid::new_v4()))),
            Some(SkipReason::NotTechSheetRequest)
        );
        assert_eq!(
            skip_reason(&record("demande", None)),
            Some(SkipReason::NotTechSheetRequest)
        );
    }

    #[test]
    fn skips_datasheet_requests_without_a_product() {
        assert_eq!(skip_reason(&record("fiche", None)), Some(SkipReason::NoProduct));
    }

    #[test]
    fn datasheet_request_with_product_is_actionable() {
        assert_eq!(skip_reason(&record("fiche", Some(Uuid::new_v4()))), None);
    }

    #[tokio::test]
    async fn non_applicable_leads_send_nothing() {
        let mailer = Arc::new(RecordingMailer::new());
        let service = service_with_mailer(Arc::clone(&mailer));

        let outcome = service
            .send_tech_sheet(&record("devis", Some(Uuid::new_v4())), &RequestContext::internal())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            NotificationOutcome::Skipped(SkipReason::NotTechSheetRequest)
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn datasheet_request_without_product_is_a_noop() {
        let mailer = Arc::new(RecordingMailer::new());
        let service = service_with_mailer(Arc::clone(&mailer));

        let outcome = service
            .send_tech_sheet(&record("fiche", None), &RequestContext::internal())
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            NotificationOutcome::Skipped(SkipReason::NoProduct)
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn request_context_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        headers.insert("user-agent", "Mozilla/5.0".parse().unwrap());

        let ctx = RequestContext::from_headers(&headers, None);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn request_context_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());

        let ctx = RequestContext::from_headers(&headers, None);
        assert_eq!(ctx.ip_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(ctx.user_agent, None);
    }
}
