//! Brevo transactional-mail client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

use super::{MailError, VerificationMailer};
use crate::config::MailConfig;
use crate::domain::auth::value_objects::Email;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<String>,
}

/// Verification mailer backed by the Brevo SMTP API
pub struct BrevoMailer {
    client: Client,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
    base_url: String,
}

impl BrevoMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        if config.api_key.trim().is_empty() {
            return Err(MailError::Configuration("mail.api_key is required".into()));
        }
        if config.sender_email.trim().is_empty() {
            return Err(MailError::Configuration(
                "mail.sender_email is required".into(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build mail HTTP client with custom timeout, using default client");
                Client::new()
            });

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            sender_email: config.sender_email.clone(),
            sender_name: Some(config.sender_name.clone()).filter(|n| !n.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_url(&self) -> String {
        format!("{}/v3/smtp/email", self.base_url)
    }
}

#[async_trait]
impl VerificationMailer for BrevoMailer {
    async fn send_verification(&self, to: &Email, verify_url: &str) -> Result<(), MailError> {
        let body = BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: to.as_str().to_string(),
                name: None,
            }],
            subject: "Verify your JurisAI account".to_string(),
            html_content: Some(format!(
                "<p>Welcome to JurisAI.</p>\
                 <p>Please <a href=\"{verify_url}\">verify your email address</a> \
                 to unlock your full daily quota.</p>"
            )),
            text_content: Some(format!(
                "Welcome to JurisAI.\n\nVerify your email address to unlock your \
                 full daily quota: {verify_url}\n"
            )),
        };

        let response = self
            .client
            .post(self.send_url())
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
