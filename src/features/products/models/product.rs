use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a catalog item (machine or accessory)
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// Display string, not a numeric amount ("Sur demande", "45 000 € HT", ...)
    pub price_label: Option<String>,
    pub image_url: Option<String>,
    pub datasheet_url: Option<String>,
    pub available: bool,
    /// True for attachments, false for machines
    pub accessories: bool,
    pub category_id: Option<Uuid>,
    pub weight_class: Option<String>,
    pub engine_power: Option<String>,
    pub operating_weight: Option<String>,
    pub bucket_capacity: Option<String>,
    pub max_digging_depth: Option<String>,
    pub max_dumping_height: Option<String>,
    pub transport_width: Option<String>,
    pub fuel_tank_capacity: Option<String>,
    pub hydraulic_flow: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
