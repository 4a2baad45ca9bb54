use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::changes::{ChangeKind, TableChange, TrackedTable};
use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::changes::handlers as changes_handlers;
use crate::features::leads::{dtos as leads_dtos, handlers as leads_handlers, models as leads_models};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
};
use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::features::quotes::{dtos as quotes_dtos, handlers as quotes_handlers};
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::get_me,
        // Categories (public)
        categories_handlers::list_categories,
        // Products (public)
        products_handlers::list_products,
        products_handlers::get_product,
        products_handlers::list_compatible,
        // Leads (public intake)
        leads_handlers::submit_lead,
        // Quotes (public intake)
        quotes_handlers::submit_quote,
        // Notification function
        notifications_handlers::send_tech_sheet,
        // Admin
        leads_handlers::list_leads_admin,
        notifications_handlers::notify_lead,
        products_handlers::list_products_admin,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        products_handlers::set_compatibilities,
        quotes_handlers::list_quotes_admin,
        quotes_handlers::update_quote_status,
        stats_handlers::get_stats,
        changes_handlers::stream_changes,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::AdminDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            ApiResponse<auth_dtos::AdminDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Products
            products_dtos::ProductResponseDto,
            products_dtos::ProductFormDto,
            products_dtos::SetCompatibilitiesDto,
            ApiResponse<Vec<products_dtos::ProductResponseDto>>,
            ApiResponse<products_dtos::ProductResponseDto>,
            // Leads
            leads_models::LeadType,
            leads_dtos::SubmitLeadDto,
            leads_dtos::LeadResponseDto,
            leads_dtos::LeadCountsDto,
            leads_dtos::AdminLeadsDto,
            leads_dtos::DatePeriod,
            ApiResponse<leads_dtos::LeadResponseDto>,
            ApiResponse<leads_dtos::AdminLeadsDto>,
            // Quotes
            quotes_dtos::SubmitQuoteRequestDto,
            quotes_dtos::UpdateQuoteStatusDto,
            quotes_dtos::QuoteRequestResponseDto,
            ApiResponse<quotes_dtos::QuoteRequestResponseDto>,
            ApiResponse<Vec<quotes_dtos::QuoteRequestResponseDto>>,
            // Notifications
            notifications_dtos::LeadRecord,
            notifications_dtos::TriggerPayload,
            notifications_dtos::NotificationResultDto,
            ApiResponse<notifications_dtos::NotificationResultDto>,
            // Stats
            stats_dtos::StatsDto,
            ApiResponse<stats_dtos::StatsDto>,
            // Change feed
            TrackedTable,
            ChangeKind,
            TableChange,
        )
    ),
    tags(
        (name = "auth", description = "Admin authentication"),
        (name = "categories", description = "Product categories (public)"),
        (name = "products", description = "Catalog items (public)"),
        (name = "leads", description = "Lead intake (public)"),
        (name = "quotes", description = "Quote request intake (public)"),
        (name = "notifications", description = "Lead notification function"),
        (name = "admin", description = "Back office (admin session required)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "TBC.MC API",
        version = "0.1.0",
        description = "API documentation for the TBC.MC catalog and back office",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
