//! In-memory store implementation
//!
//! Default backend for tests and development. All mutations run under a
//! single async mutex, so quota charges are serialized per store and the
//! read-modify-write cycle can never interleave between two requests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::auth::{
    entities::Account,
    errors::StorageError,
    repositories::{AccountRepository, GuestUsageRepository},
    value_objects::{AccountId, Email},
};
use crate::domain::quota::{AccountCharge, GateDecision, GuestCharge, QuotaPolicy};

#[derive(Default)]
struct MemoryData {
    accounts: HashMap<Uuid, Account>,
    guests: HashMap<String, u32>,
}

/// In-memory account and guest-usage store
pub struct InMemoryStore {
    inner: Mutex<MemoryData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryData::default()),
        }
    }

    /// Insert an account directly, bypassing uniqueness checks.
    ///
    /// Seeding utility for tests and local development fixtures.
    pub async fn insert_account(&self, account: Account) {
        let mut data = self.inner.lock().await;
        data.accounts.insert(account.account_id.as_uuid(), account);
    }

    /// Current guest counter for an origin, if a record exists
    pub async fn guest_usage(&self, origin: &str) -> Option<u32> {
        let data = self.inner.lock().await;
        data.guests.get(origin).copied()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StorageError> {
        let data = self.inner.lock().await;
        Ok(data
            .accounts
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> Result<Option<Account>, StorageError> {
        let data = self.inner.lock().await;
        Ok(data.accounts.get(&account_id.as_uuid()).cloned())
    }

    async fn create(&self, account: &Account) -> Result<(), StorageError> {
        let mut data = self.inner.lock().await;
        if data.accounts.values().any(|a| a.email == account.email) {
            return Err(StorageError::DuplicateEmail);
        }
        data.accounts
            .insert(account.account_id.as_uuid(), account.clone());
        Ok(())
    }

    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>, StorageError> {
        let mut data = self.inner.lock().await;
        let account = data
            .accounts
            .values_mut()
            .find(|a| a.verification_token.as_deref() == Some(token));

        match account {
            Some(account) => {
                if account.consume_verification_token(token) {
                    Ok(Some(account.clone()))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    async fn charge(
        &self,
        account_id: &AccountId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, StorageError> {
        let mut data = self.inner.lock().await;
        let account = data
            .accounts
            .get_mut(&account_id.as_uuid())
            .ok_or(StorageError::NotFound)?;

        let charge = policy.evaluate_account(
            account.usage_count,
            account.exhausted_at,
            account.verified,
            now,
        );

        match charge {
            AccountCharge::Admit {
                new_count,
                new_exhausted_at,
                remaining,
            } => {
                account.usage_count = new_count;
                account.exhausted_at = new_exhausted_at;
                account.updated_at = now;
                Ok(GateDecision::Admitted { remaining })
            }
            AccountCharge::Reject {
                error,
                arm_exhausted_at,
            } => {
                if let Some(at) = arm_exhausted_at {
                    account.exhausted_at = Some(at);
                    account.updated_at = now;
                }
                Ok(GateDecision::Rejected(error))
            }
        }
    }
}

#[async_trait]
impl GuestUsageRepository for InMemoryStore {
    async fn charge(
        &self,
        origin: &str,
        policy: &QuotaPolicy,
    ) -> Result<GateDecision, StorageError> {
        let mut data = self.inner.lock().await;
        let count = data.guests.entry(origin.to_string()).or_insert(0);

        match policy.evaluate_guest(*count) {
            GuestCharge::Admit {
                new_count,
                remaining,
            } => {
                *count = new_count;
                Ok(GateDecision::Admitted { remaining })
            }
            GuestCharge::Reject(error) => Ok(GateDecision::Rejected(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::value_objects::PasswordHash;
    use crate::domain::quota::QuotaError;

    fn test_account(email: &str) -> Account {
        Account::new(
            AccountId::generate(),
            Email::new(email.to_string()).unwrap(),
            PasswordHash::new("hashed".to_string()),
            "verify-token".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryStore::new();
        let account = test_account("a@x.com");

        store.create(&account).await.unwrap();

        let by_email = store
            .find_by_email(&Email::new("a@x.com".to_string()).unwrap())
            .await
            .unwrap();
        assert!(by_email.is_some());

        let by_id = store.find_by_id(&account.account_id).await.unwrap();
        assert_eq!(by_id.unwrap().account_id, account.account_id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store.create(&test_account("a@x.com")).await.unwrap();

        let result = store.create(&test_account("a@x.com")).await;
        assert_eq!(result.unwrap_err(), StorageError::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_consume_verification_token_once() {
        let store = InMemoryStore::new();
        let account = test_account("a@x.com");
        store.create(&account).await.unwrap();

        let consumed = store
            .consume_verification_token("verify-token")
            .await
            .unwrap();
        assert!(consumed.unwrap().verified);

        // Replay fails
        let replay = store
            .consume_verification_token("verify-token")
            .await
            .unwrap();
        assert!(replay.is_none());
    }

    #[tokio::test]
    async fn test_guest_charge_sequence() {
        let store = InMemoryStore::new();
        let policy = QuotaPolicy::default();

        assert_eq!(
            GuestUsageRepository::charge(&store, "1.2.3.4", &policy)
                .await
                .unwrap(),
            GateDecision::Admitted { remaining: 1 }
        );
        assert_eq!(
            GuestUsageRepository::charge(&store, "1.2.3.4", &policy)
                .await
                .unwrap(),
            GateDecision::Admitted { remaining: 0 }
        );
        assert_eq!(
            GuestUsageRepository::charge(&store, "1.2.3.4", &policy)
                .await
                .unwrap(),
            GateDecision::Rejected(QuotaError::GuestLimitExhausted)
        );

        // A different origin is tracked independently
        assert_eq!(
            GuestUsageRepository::charge(&store, "5.6.7.8", &policy)
                .await
                .unwrap(),
            GateDecision::Admitted { remaining: 1 }
        );
    }

    #[tokio::test]
    async fn test_account_charge_updates_state() {
        let store = InMemoryStore::new();
        let policy = QuotaPolicy::default();
        let account = test_account("a@x.com");
        let id = account.account_id;
        store.create(&account).await.unwrap();

        AccountRepository::charge(&store, &id, &policy, Utc::now())
            .await
            .unwrap();
        AccountRepository::charge(&store, &id, &policy, Utc::now())
            .await
            .unwrap();

        let stored = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 2);

        // Third request hits the unverified ceiling
        let decision = AccountRepository::charge(&store, &id, &policy, Utc::now())
            .await
            .unwrap();
        assert_eq!(
            decision,
            GateDecision::Rejected(QuotaError::VerificationRequired)
        );
    }

    #[tokio::test]
    async fn test_charge_unknown_account() {
        let store = InMemoryStore::new();
        let policy = QuotaPolicy::default();

        let result =
            AccountRepository::charge(&store, &AccountId::generate(), &policy, Utc::now()).await;
        assert_eq!(result.unwrap_err(), StorageError::NotFound);
    }
}
