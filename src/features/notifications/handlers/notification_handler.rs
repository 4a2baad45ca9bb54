use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppJsonRejection};
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::auth::AuthService;
use crate::features::leads::LeadService;
use crate::features::notifications::dtos::{
    LeadRecord, NotificationResultDto, TriggerPayload,
};
use crate::features::notifications::services::{
    NotificationOutcome, NotificationService, RequestContext,
};
use crate::shared::types::ApiResponse;

/// Shared state for the notification endpoints
#[derive(Clone)]
pub struct NotificationState {
    pub service: Arc<NotificationService>,
    pub auth: Arc<AuthService>,
    pub leads: Arc<LeadService>,
}

/// CORS preflight for the notification function
///
/// The permissive CORS headers come from the shared CORS layer; the body
/// is intentionally empty.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Notification function: HTTP entry point
///
/// Invoked with a create-trigger style payload `{ "record": { ... } }` and
/// a bearer credential. Keeps the historical function wire format:
/// `{ message, email_id? }` on success, `{ error }` on failure.
#[utoipa::path(
    post,
    path = "/functions/send-tech-sheet",
    request_body = TriggerPayload,
    responses(
        (status = 200, description = "Email dispatched, or intentional no-op"),
        (status = 401, description = "Missing or invalid bearer credential"),
        (status = 404, description = "Referenced product not found"),
        (status = 500, description = "Unexpected failure")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn send_tech_sheet(
    State(state): State<NotificationState>,
    headers: HeaderMap,
    payload: std::result::Result<AppJson<TriggerPayload>, AppJsonRejection>,
) -> Response {
    // The credential is checked first: a missing or invalid bearer fails
    // the call before the body is even looked at.
    let admin = match authorize(&state, &headers).await {
        Ok(admin) => admin,
        Err(response) => return response,
    };

    let AppJson(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection.into_response(),
    };

    let ctx = RequestContext::from_headers(&headers, Some(admin.admin_id));

    match state.service.send_tech_sheet(&payload.record, &ctx).await {
        Ok(outcome) => function_success(outcome),
        Err(e) => function_failure(e),
    }
}

async fn authorize(
    state: &NotificationState,
    headers: &HeaderMap,
) -> std::result::Result<AuthenticatedAdmin, Response> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            function_error(
                StatusCode::UNAUTHORIZED,
                "Unauthorized: Missing authorization header",
            )
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        function_error(StatusCode::UNAUTHORIZED, "Unauthorized: Invalid token")
    })?;

    state
        .auth
        .authenticate_token(token)
        .await
        .map_err(|_| function_error(StatusCode::UNAUTHORIZED, "Unauthorized: Invalid token"))
}

fn function_success(outcome: NotificationOutcome) -> Response {
    let body = match outcome {
        NotificationOutcome::Sent { email_id } => json!({
            "message": "Email sent successfully",
            "email_id": email_id,
        }),
        NotificationOutcome::Skipped(reason) => json!({
            "message": reason.message(),
        }),
    };

    (StatusCode::OK, Json(body)).into_response()
}

fn function_failure(error: AppError) -> Response {
    match error {
        AppError::NotFound(_) => function_error(StatusCode::NOT_FOUND, "Product not found"),
        other => {
            tracing::error!("Notification function failed: {}", other);
            function_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                &other.to_string(),
            )
        }
    }
}

fn function_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Manual notification trigger for a lead
///
/// The console exposes this per pending datasheet-request lead; it re-runs
/// the same pipeline the create trigger uses.
#[utoipa::path(
    post,
    path = "/api/admin/leads/{id}/notify",
    params(
        ("id" = Uuid, Path, description = "Lead ID")
    ),
    responses(
        (status = 200, description = "Pipeline ran", body = ApiResponse<NotificationResultDto>),
        (status = 404, description = "Lead or product not found"),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn notify_lead(
    admin: AuthenticatedAdmin,
    State(state): State<NotificationState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationResultDto>>> {
    let lead = state.leads.get(id).await?;
    let record = LeadRecord::from(lead);

    let ctx = RequestContext::from_headers(&headers, Some(admin.admin_id));
    let outcome = state.service.send_tech_sheet(&record, &ctx).await?;

    let result = match outcome {
        NotificationOutcome::Sent { email_id } => NotificationResultDto {
            message: "Email sent successfully".to_string(),
            email_id,
        },
        NotificationOutcome::Skipped(reason) => NotificationResultDto {
            message: reason.message().to_string(),
            email_id: None,
        },
    };

    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::changes::ChangeFeed;
    use crate::core::config::AuthConfig;
    use crate::features::notifications::routes;
    use crate::features::notifications::services::SecurityAuditService;
    use crate::modules::mailer::{EmailSender, OutgoingEmail, SendReceipt};
    use crate::shared::constants::CHANGE_FEED_CAPACITY;
    use async_trait::async_trait;
    use axum::http::Method;
    use axum_test::TestServer;
    use serde_json::json;
    use std::time::Duration;

    struct NullMailer;

    #[async_trait]
    impl EmailSender for NullMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<SendReceipt> {
            Ok(SendReceipt { email_id: None })
        }
    }

    fn test_server() -> TestServer {
        let pool = crate::core::database::lazy_test_pool();

        let changes = Arc::new(ChangeFeed::new(CHANGE_FEED_CAPACITY));
        let auth = Arc::new(AuthService::new(
            pool.clone(),
            AuthConfig {
                jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
                token_ttl: Duration::from_secs(3600),
                jwt_leeway: Duration::from_secs(60),
            },
        ));
        let audit = Arc::new(SecurityAuditService::new(pool.clone()));
        let service = Arc::new(NotificationService::new(
            pool.clone(),
            Arc::new(NullMailer),
            audit,
            Arc::clone(&changes),
        ));
        let leads = Arc::new(LeadService::new(pool, changes));

        let state = NotificationState {
            service,
            auth,
            leads,
        };

        TestServer::new(routes::function_routes(state)).expect("test server")
    }

    fn trigger_body() -> serde_json::Value {
        json!({
            "record": {
                "id": Uuid::new_v4(),
                "email": "jean@example.com",
                "name": "Jean",
                "type": "fiche",
                "product_id": Uuid::new_v4(),
            }
        })
    }

    #[tokio::test]
    async fn preflight_returns_no_content() {
        let server = test_server();
        let response = server
            .method(Method::OPTIONS, "/functions/send-tech-sheet")
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn missing_credential_is_rejected_before_anything_else() {
        let server = test_server();
        let response = server
            .post("/functions/send-tech-sheet")
            .json(&trigger_body())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Unauthorized: Missing authorization header");
    }

    #[tokio::test]
    async fn non_bearer_credential_is_rejected() {
        let server = test_server();
        let response = server
            .post("/functions/send-tech-sheet")
            .add_header("authorization", "Basic dXNlcjpwYXNz")
            .json(&trigger_body())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Unauthorized: Invalid token");
    }

    #[tokio::test]
    async fn garbage_bearer_token_is_rejected() {
        let server = test_server();
        let response = server
            .post("/functions/send-tech-sheet")
            .add_header("authorization", "Bearer not-a-real-token")
            .json(&trigger_body())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Unauthorized: Invalid token");
    }
}
