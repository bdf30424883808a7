//! Quota charge use case backing the request gate

use std::sync::Arc;

use chrono::Utc;

use crate::application::auth::use_cases::ValidateTokenUseCase;
use crate::application::errors::ApplicationError;
use crate::domain::auth::{
    errors::{AuthError, StorageError},
    repositories::{AccountRepository, GuestUsageRepository},
};
use crate::domain::quota::{GateDecision, QuotaPolicy};

/// Use case charging one gated request against the caller's quota.
///
/// Classification happens at the gate: callers presenting a bearer token are
/// charged against their account tier, everyone else against the guest
/// counter for their network origin. Storage failures propagate so the gate
/// fails closed.
pub struct ChargeQuotaUseCase {
    accounts: Arc<dyn AccountRepository>,
    guests: Arc<dyn GuestUsageRepository>,
    validate_token: Arc<ValidateTokenUseCase>,
    policy: QuotaPolicy,
}

impl ChargeQuotaUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        guests: Arc<dyn GuestUsageRepository>,
        validate_token: Arc<ValidateTokenUseCase>,
        policy: QuotaPolicy,
    ) -> Self {
        Self {
            accounts,
            guests,
            validate_token,
            policy,
        }
    }

    /// Charge an authenticated request identified by a bearer token.
    ///
    /// An invalid or expired token, or a token whose account no longer
    /// exists, is an authentication failure rather than a guest fallback.
    pub async fn charge_bearer(&self, token: &str) -> Result<GateDecision, ApplicationError> {
        let (account_id, _email) = self.validate_token.execute(token)?;

        match self
            .accounts
            .charge(&account_id, &self.policy, Utc::now())
            .await
        {
            Ok(decision) => Ok(decision),
            Err(StorageError::NotFound) => Err(AuthError::InvalidToken.into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Charge an anonymous request identified by its network origin
    pub async fn charge_guest(&self, origin: &str) -> Result<GateDecision, ApplicationError> {
        Ok(self.guests.charge(origin, &self.policy).await?)
    }
}
