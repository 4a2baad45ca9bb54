use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::products::models::Product;
use crate::shared::validation::not_blank;

/// Response DTO for a catalog item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price_label: Option<String>,
    pub image_url: Option<String>,
    pub datasheet_url: Option<String>,
    pub available: bool,
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

impl From<Product> for ProductResponseDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            brand: p.brand,
            description: p.description,
            price_label: p.price_label,
            image_url: p.image_url,
            datasheet_url: p.datasheet_url,
            available: p.available,
            accessories: p.accessories,
            category_id: p.category_id,
            weight_class: p.weight_class,
            engine_power: p.engine_power,
            operating_weight: p.operating_weight,
            bucket_capacity: p.bucket_capacity,
            max_digging_depth: p.max_digging_depth,
            max_dumping_height: p.max_dumping_height,
            transport_width: p.transport_width,
            fuel_tank_capacity: p.fuel_tank_capacity,
            hydraulic_flow: p.hydraulic_flow,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Request DTO covering every product attribute (create and full update)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductFormDto {
    #[validate(custom(function = not_blank, message = "Name is required"))]
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price_label: Option<String>,
    pub image_url: Option<String>,
    pub datasheet_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
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
}

fn default_available() -> bool {
    true
}

/// Query params for the public catalog listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProductListQuery {
    /// Filter on the accessory flag (true = attachments, false = machines)
    pub accessories: Option<bool>,
    /// Filter on availability
    pub available: Option<bool>,
    /// Filter on category
    pub category_id: Option<Uuid>,
    /// Cap the number of returned items (landing page "featured" strip)
    pub limit: Option<i64>,
}

/// Query params for the admin product listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AdminProductListQuery {
    /// Free-text filter over name, brand and description (case-insensitive)
    pub search: Option<String>,
}

/// Request DTO replacing the compatibility link set of a product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetCompatibilitiesDto {
    /// For an accessory: compatible machine ids. For a machine: compatible accessory ids.
    pub product_ids: Vec<Uuid>,
}
