use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::leads::dtos::{
    AdminLeadsDto, LeadListQuery, LeadResponseDto, SubmitLeadDto,
};
use crate::features::leads::services::LeadService;
use crate::shared::types::ApiResponse;

/// Submit a lead from the public site
///
/// Covers the contact form and the per-product datasheet/quote forms.
/// Validation failures return the specific violated rule; nothing is
/// stored in that case.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = SubmitLeadDto,
    responses(
        (status = 201, description = "Lead stored", body = ApiResponse<LeadResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "leads"
)]
pub async fn submit_lead(
    State(service): State<Arc<LeadService>>,
    AppJson(dto): AppJson<SubmitLeadDto>,
) -> Result<(axum::http::StatusCode, Json<ApiResponse<LeadResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let lead = service.submit(dto).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(lead),
            Some("Votre demande a bien été envoyée".to_string()),
            None,
        )),
    ))
}

/// Admin leads view
///
/// Returns every lead newest-first after in-memory filtering, with the
/// aggregate counters (total / sent / pending / filtered).
#[utoipa::path(
    get,
    path = "/api/admin/leads",
    params(LeadListQuery),
    responses(
        (status = 200, description = "Leads and counters", body = ApiResponse<AdminLeadsDto>),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_leads_admin(
    _admin: AuthenticatedAdmin,
    State(service): State<Arc<LeadService>>,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<ApiResponse<AdminLeadsDto>>> {
    let view = service.list_admin(&query).await?;
    Ok(Json(ApiResponse::success(Some(view), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::changes::ChangeFeed;
    use crate::features::leads::routes;
    use crate::shared::constants::CHANGE_FEED_CAPACITY;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn test_server() -> TestServer {
        let service = Arc::new(LeadService::new(
            crate::core::database::lazy_test_pool(),
            Arc::new(ChangeFeed::new(CHANGE_FEED_CAPACITY)),
        ));
        TestServer::new(routes::routes(service)).expect("test server")
    }

    #[tokio::test]
    async fn blank_required_fields_are_rejected() {
        let server = test_server();
        let response = server
            .post("/api/leads")
            .json(&json!({ "name": "  ", "email": "", "message": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_with_the_specific_rule() {
        let server = test_server();
        let response = server
            .post("/api/leads")
            .json(&json!({
                "name": "Jean Dupont",
                "email": "jean@example",
                "message": "Bonjour"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let message = body["message"].as_str().unwrap_or_default();
        assert!(message.contains("Invalid email format"));
    }

    #[tokio::test]
    async fn over_length_message_is_rejected() {
        let server = test_server();
        let response = server
            .post("/api/leads")
            .json(&json!({
                "name": "Jean Dupont",
                "email": "jean@example.com",
                "message": "x".repeat(1001)
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        let message = body["message"].as_str().unwrap_or_default();
        assert!(message.contains("1000"));
    }

    #[tokio::test]
    async fn admin_view_requires_a_session() {
        let service = Arc::new(LeadService::new(
            crate::core::database::lazy_test_pool(),
            Arc::new(ChangeFeed::new(CHANGE_FEED_CAPACITY)),
        ));

        // Without an injected session the guard rejects the request
        let bare = TestServer::new(routes::admin_routes(Arc::clone(&service))).expect("server");
        bare.get("/leads")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // With a session the request passes the guard and only fails at
        // the store (no database in tests)
        let authed = TestServer::new(crate::shared::test_helpers::with_admin_auth(
            routes::admin_routes(service),
        ))
        .expect("server");
        authed
            .get("/leads")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn message_at_the_cap_passes_validation() {
        // Reaches the store and fails there (no database in tests), which
        // proves validation accepted the payload.
        let server = test_server();
        let response = server
            .post("/api/leads")
            .json(&json!({
                "name": "Jean Dupont",
                "email": "jean@example.com",
                "message": "x".repeat(1000)
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
