//! Repository traits for accounts and anonymous-caller usage records
//!
//! The quota charge operations are serialized inside the store (the whole
//! read-evaluate-write cycle runs under the store's lock), so two concurrent
//! requests for the same caller can never observe the same pre-increment
//! counter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entities::Account;
use super::errors::StorageError;
use super::value_objects::{AccountId, Email};
use crate::domain::quota::{GateDecision, QuotaPolicy};

/// Account repository trait for identity and quota persistence
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by email address
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StorageError>;

    /// Find an account by account ID
    async fn find_by_id(&self, account_id: &AccountId) -> Result<Option<Account>, StorageError>;

    /// Create a new account.
    ///
    /// Fails with `StorageError::DuplicateEmail` if the email is already
    /// registered, without mutating the store.
    async fn create(&self, account: &Account) -> Result<(), StorageError>;

    /// Atomically consume an unconsumed verification token.
    ///
    /// On a match the account is marked verified, the token is cleared, and
    /// the updated account is returned. Returns `None` when no account holds
    /// the token (including replays of an already-consumed token).
    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>, StorageError>;

    /// Charge one gated request against the account's quota.
    ///
    /// Evaluates the admission policy and applies the resulting counter and
    /// exhaustion-timestamp mutations in a single serialized operation.
    /// Fails with `StorageError::NotFound` if the account does not exist.
    async fn charge(
        &self,
        account_id: &AccountId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, StorageError>;
}

/// Repository trait for anonymous-caller usage records, keyed by network origin
#[async_trait]
pub trait GuestUsageRepository: Send + Sync {
    /// Charge one gated request against the origin's counter.
    ///
    /// The record is created lazily on first use. The counter is monotonic
    /// and never resets for the lifetime of the stored record.
    async fn charge(&self, origin: &str, policy: &QuotaPolicy) -> Result<GateDecision, StorageError>;
}
