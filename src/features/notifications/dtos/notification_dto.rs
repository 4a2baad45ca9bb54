use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::leads::models::Lead;

/// Lead fields carried by a create-trigger payload or a manual invocation.
///
/// Extra fields in the payload are ignored; only what the pipeline needs
/// is kept.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub lead_type: String,
    pub product_id: Option<Uuid>,
}

impl From<Lead> for LeadRecord {
    fn from(l: Lead) -> Self {
        Self {
            id: l.id,
            email: l.email,
            name: l.name,
            lead_type: l.lead_type,
            product_id: l.product_id,
        }
    }
}

/// Body of a POST to the notification function: `{ "record": { ... } }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TriggerPayload {
    pub record: LeadRecord,
}

/// Result of a notification run, as returned to admin callers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResultDto {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}
