//! Verification email dispatch

pub mod brevo;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::auth::value_objects::Email;

pub use brevo::BrevoMailer;

/// Mail dispatch error
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail network error: {0}")]
    Network(String),

    #[error("Mail provider rejected the message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Mailer misconfigured: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Network(err.to_string())
    }
}

/// Sender for account-verification emails.
///
/// Dispatch is fire-and-forget from the caller's perspective: the register
/// path spawns the send as a detached task and never awaits it.
#[async_trait]
pub trait VerificationMailer: Send + Sync {
    async fn send_verification(&self, to: &Email, verify_url: &str) -> Result<(), MailError>;
}

/// Mailer that only logs, for development and tests
pub struct NoopMailer;

#[async_trait]
impl VerificationMailer for NoopMailer {
    async fn send_verification(&self, to: &Email, verify_url: &str) -> Result<(), MailError> {
        tracing::debug!(email = %to, url = %verify_url, "Mail disabled; skipping verification email");
        Ok(())
    }
}
