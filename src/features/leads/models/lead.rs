use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tag distinguishing what a contact event asks for.
///
/// Stored as free text in the leads table; the wire values are the French
/// form-context tags the site has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadType {
    /// Technical datasheet request
    Fiche,
    /// Quote request
    Devis,
    /// Generic inquiry
    Demande,
}

impl LeadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadType::Fiche => "fiche",
            LeadType::Devis => "devis",
            LeadType::Demande => "demande",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fiche" => Some(LeadType::Fiche),
            "devis" => Some(LeadType::Devis),
            "demande" => Some(LeadType::Demande),
            _ => None,
        }
    }
}

impl Default for LeadType {
    fn default() -> Self {
        LeadType::Demande
    }
}

impl std::fmt::Display for LeadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for a contact event
#[derive(Debug, Clone, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub message: Option<String>,
    #[sqlx(rename = "type")]
    pub lead_type: String,
    pub product_id: Option<Uuid>,
    /// Whether the notification email for this lead has been dispatched.
    /// Transitions false -> true exactly once, never reset.
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}
