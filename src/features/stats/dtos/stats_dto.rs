use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate statistics for the back office dashboard.
///
/// Derived from wholesale loads of the leads and products tables; the
/// console recomputes by re-requesting on any change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatsDto {
    pub total_leads: i64,
    pub leads_this_week: i64,
    pub leads_this_month: i64,
    pub emails_sent: i64,
    pub emails_pending: i64,
    pub fiche_requests: i64,
    pub devis_requests: i64,
    pub total_products: i64,
    pub available_products: i64,
    /// Attachments (accessory flag set)
    pub accessories: i64,
    /// Machines (accessory flag unset)
    pub machines: i64,
}
