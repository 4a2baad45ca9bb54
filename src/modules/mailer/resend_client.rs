//! Transactional email client for the Resend HTTP API
//!
//! The provider is reached over plain HTTPS JSON; the [`EmailSender`] trait
//! keeps the notification pipeline testable with a recording mock.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::MailerConfig;
use crate::core::error::{AppError, Result};

/// An email ready for dispatch
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgment for a dispatched email
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Provider-side message identifier, when the provider returns one
    pub email_id: Option<String>,
}

/// Boundary to the transactional email provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendReceipt>;
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Resend-compatible HTTP client
pub struct ResendClient {
    config: MailerConfig,
    http_client: Client,
}

impl ResendClient {
    pub fn new(config: MailerConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendReceipt> {
        let request = SendEmailRequest {
            from: &self.config.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Email provider request failed: {}", e);
                AppError::ExternalServiceError(format!("Email provider unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Email provider rejected send: status={}, body={}", status, body);
            return Err(AppError::ExternalServiceError(format!(
                "Email provider returned {}",
                status
            )));
        }

        let parsed: SendEmailResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse email provider response: {}", e);
            AppError::ExternalServiceError(format!("Invalid email provider response: {}", e))
        })?;

        tracing::info!("Email dispatched: to={}, id={:?}", email.to, parsed.id);

        Ok(SendReceipt {
            email_id: parsed.id,
        })
    }
}
