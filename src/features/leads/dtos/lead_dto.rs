use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::leads::models::{Lead, LeadType};
use crate::shared::validation::{not_blank, EMAIL_REGEX};

/// Request DTO for the public lead form (contact, datasheet or quote context)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitLeadDto {
    #[validate(custom(function = not_blank, message = "Name is required"))]
    pub name: String,

    #[validate(
        custom(function = not_blank, message = "Email is required"),
        regex(path = *EMAIL_REGEX, message = "Invalid email format")
    )]
    pub email: String,

    pub phone: Option<String>,

    pub company: Option<String>,

    #[validate(
        custom(function = not_blank, message = "Message is required"),
        length(max = 1000, message = "Message must not exceed 1000 characters")
    )]
    pub message: String,

    /// Form context: datasheet request, quote request or generic inquiry
    #[serde(rename = "type", default)]
    pub lead_type: LeadType,

    /// Product the form was opened from, if any
    pub product_id: Option<Uuid>,
}

/// Response DTO for a lead
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadResponseDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub lead_type: String,
    pub product_id: Option<Uuid>,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Lead> for LeadResponseDto {
    fn from(l: Lead) -> Self {
        Self {
            id: l.id,
            email: l.email,
            name: l.name,
            phone: l.phone,
            company_name: l.company_name,
            message: l.message,
            lead_type: l.lead_type,
            product_id: l.product_id,
            sent: l.sent,
            created_at: l.created_at,
        }
    }
}

/// Query params for the admin leads view
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LeadListQuery {
    /// Free-text filter over name, email and company (case-insensitive)
    pub search: Option<String>,
    /// Filter on the type tag
    #[serde(rename = "type")]
    pub lead_type: Option<LeadType>,
    /// Creation-date bucket: today, week or month
    pub period: Option<DatePeriod>,
    /// Viewer's UTC offset in minutes east of UTC, used for the "today" bucket
    pub tz_offset_minutes: Option<i32>,
}

/// Creation-date bucket relative to the viewer's clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatePeriod {
    Today,
    Week,
    Month,
}

/// Aggregate counters shown above the leads table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadCountsDto {
    pub total: i64,
    pub sent: i64,
    pub pending: i64,
    pub filtered: i64,
}

/// Admin leads view payload: the filtered rows plus the aggregate counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLeadsDto {
    pub leads: Vec<LeadResponseDto>,
    pub counts: LeadCountsDto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::fr_fr::Name;
    use fake::Fake;

    fn valid_dto() -> SubmitLeadDto {
        SubmitLeadDto {
            name: Name().fake(),
            email: SafeEmail().fake(),
            phone: None,
            company: None,
            message: "Bonjour, je souhaite plus d'informations.".to_string(),
            lead_type: LeadType::Demande,
            product_id: None,
        }
    }

    #[test]
    fn well_formed_submissions_validate() {
        for _ in 0..20 {
            let dto = valid_dto();
            assert!(dto.validate().is_ok(), "should validate: {:?}", dto);
        }
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        let mut dto = valid_dto();
        dto.name = "   ".to_string();
        assert!(dto.validate().is_err());

        let mut dto = valid_dto();
        dto.message = String::new();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn email_without_tld_fails_validation() {
        let mut dto = valid_dto();
        dto.email = "jean@example".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn message_over_the_cap_fails_validation() {
        let mut dto = valid_dto();
        dto.message = "x".repeat(1001);
        assert!(dto.validate().is_err());

        dto.message = "x".repeat(1000);
        assert!(dto.validate().is_ok());
    }
}
