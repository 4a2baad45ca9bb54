use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::changes::{ChangeFeed, ChangeKind, TrackedTable};
use crate::core::error::Result;
use crate::features::leads::LeadService;
use crate::features::notifications::dtos::LeadRecord;
use crate::features::notifications::services::{
    skip_reason, NotificationOutcome, NotificationService, RequestContext,
};
use uuid::Uuid;

/// Background worker reacting to lead inserts on the change feed.
///
/// Every new lead runs through the notification pipeline; the pipeline
/// itself decides whether an email is warranted. One failed lead never
/// stops the watcher.
pub struct LeadWatcher {
    leads: Arc<LeadService>,
    service: Arc<NotificationService>,
    changes: Arc<ChangeFeed>,
}

impl LeadWatcher {
    pub fn new(
        leads: Arc<LeadService>,
        service: Arc<NotificationService>,
        changes: Arc<ChangeFeed>,
    ) -> Self {
        Self {
            leads,
            service,
            changes,
        }
    }

    /// Run the watcher loop until the feed closes
    pub async fn run(&self) {
        tracing::info!("Starting lead notification watcher");

        let mut rx = self.changes.subscribe();

        loop {
            match rx.recv().await {
                Ok(change)
                    if change.table == TrackedTable::Leads
                        && change.kind == ChangeKind::Insert =>
                {
                    if let Err(e) = self.handle_new_lead(change.record_id).await {
                        tracing::error!(
                            "Notification for lead {} failed: {}",
                            change.record_id,
                            e
                        );
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Lead watcher lagged, {} change events skipped", skipped);
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Change feed closed, stopping lead watcher");
                    break;
                }
            }
        }
    }

    async fn handle_new_lead(&self, lead_id: Uuid) -> Result<()> {
        let lead = self.leads.get(lead_id).await?;
        let record = LeadRecord::from(lead);

        // Skip early to keep the audit log free of trigger noise for
        // leads the pipeline would ignore anyway.
        if skip_reason(&record).is_some() {
            return Ok(());
        }

        let outcome = self
            .service
            .send_tech_sheet(&record, &RequestContext::internal())
            .await?;

        if let NotificationOutcome::Sent { email_id } = outcome {
            tracing::info!(
                "Datasheet email dispatched for lead {}: id={:?}",
                lead_id,
                email_id
            );
        }

        Ok(())
    }
}
