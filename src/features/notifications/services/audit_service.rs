use sqlx::PgPool;
use uuid::Uuid;

/// One entry for the append-only security audit log
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub action: &'a str,
    pub table_name: &'a str,
    pub record_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Best-effort writer for the security audit log.
///
/// Audit is advisory, not a gate: a failed write is reported to the
/// operator log and the caller proceeds.
pub struct SecurityAuditService {
    pool: PgPool,
}

impl SecurityAuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, entry: AuditEntry<'_>) {
        let result = sqlx::query(
            r#"
            INSERT INTO security_audit_log
                (action, table_name, record_id, admin_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.action)
        .bind(entry.table_name)
        .bind(entry.record_id)
        .bind(entry.admin_id)
        .bind(entry.ip_address)
        .bind(entry.user_agent)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                "Failed to write security audit entry (action={}): {:?}",
                entry.action,
                e
            );
        }
    }
}
