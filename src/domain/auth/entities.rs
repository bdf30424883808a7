//! Authentication domain entities

use chrono::{DateTime, Utc};

use super::value_objects::*;

/// Account aggregate root
///
/// A registered identity together with its quota state: the monotonic usage
/// counter, the exhaustion timestamp that arms the daily reset, and the
/// email-verification state that selects the quota tier.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account identifier
    pub account_id: AccountId,
    /// Account email address (unique)
    pub email: Email,
    /// Hashed password (never expose raw hash)
    pub password_hash: PasswordHash,
    /// Number of gated requests charged in the current window
    pub usage_count: u32,
    /// When the account hit its tier limit (None while active)
    pub exhausted_at: Option<DateTime<Utc>>,
    /// Whether the email address has been verified
    pub verified: bool,
    /// Pending single-use verification token (None once consumed)
    pub verification_token: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new unverified account with a pending verification token
    pub fn new(
        account_id: AccountId,
        email: Email,
        password_hash: PasswordHash,
        verification_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            email,
            password_hash,
            usage_count: 0,
            exhausted_at: None,
            verified: false,
            verification_token: Some(verification_token),
            created_at: now,
            updated_at: now,
        }
    }

    /// Consume the pending verification token, marking the account verified.
    ///
    /// Returns false if there is no unconsumed token or it does not match;
    /// the account is left untouched in that case.
    pub fn consume_verification_token(&mut self, token: &str) -> bool {
        match self.verification_token.as_deref() {
            Some(pending) if pending == token => {
                self.verified = true;
                self.verification_token = None;
                self.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Check whether the account has a pending (unconsumed) verification token
    pub fn has_pending_verification(&self) -> bool {
        self.verification_token.is_some()
    }
}
