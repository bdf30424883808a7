//! JSON-file-backed store implementation
//!
//! Production default: the whole structure is loaded at startup, mutated in
//! memory, and written back after each change. Every mutation runs under one
//! async mutex, so concurrent charges for the same caller serialize instead
//! of racing the read-modify-write cycle. File I/O is bounded by an explicit
//! timeout.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::auth::{
    entities::Account,
    errors::StorageError,
    repositories::{AccountRepository, GuestUsageRepository},
    value_objects::{AccountId, Email, PasswordHash},
};
use crate::domain::quota::{AccountCharge, GateDecision, GuestCharge, QuotaPolicy};

/// Persisted form of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    usage_count: u32,
    exhausted_at: Option<DateTime<Utc>>,
    verified: bool,
    verification_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRecord {
    fn from_entity(account: &Account) -> Self {
        Self {
            id: account.account_id.as_uuid(),
            email: account.email.as_str().to_string(),
            password_hash: account.password_hash.as_str().to_string(),
            usage_count: account.usage_count,
            exhausted_at: account.exhausted_at,
            verified: account.verified,
            verification_token: account.verification_token.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }

    fn into_entity(self) -> Result<Account, StorageError> {
        let email = Email::new(self.email.clone()).map_err(|e| {
            StorageError::Serialization(format!("stored email invalid ({}): {}", self.email, e))
        })?;

        Ok(Account {
            account_id: AccountId::from(self.id),
            email,
            password_hash: PasswordHash::from(self.password_hash),
            usage_count: self.usage_count,
            exhausted_at: self.exhausted_at,
            verified: self.verified,
            verification_token: self.verification_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Whole-file structure: registered accounts plus anonymous-caller counters
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    accounts: Vec<AccountRecord>,
    #[serde(default)]
    guests: HashMap<String, u32>,
}

/// JSON-file-backed account and guest-usage store
pub struct JsonFileStore {
    path: PathBuf,
    io_timeout: Duration,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open the store, loading existing data if the file is present
    pub async fn open(path: impl AsRef<Path>, io_timeout: Duration) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            Self::with_timeout(io_timeout, tokio::fs::create_dir_all(parent)).await?;
        }

        let read = tokio::time::timeout(io_timeout, tokio::fs::read(&path))
            .await
            .map_err(|_| StorageError::Timeout(io_timeout.as_secs()))?;

        let data = match read {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };

        tracing::info!(path = %path.display(), "Opened JSON store");

        Ok(Self {
            path,
            io_timeout,
            data: Mutex::new(data),
        })
    }

    async fn with_timeout<T>(
        io_timeout: Duration,
        fut: impl Future<Output = std::io::Result<T>>,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(io_timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(io_timeout.as_secs()))?
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    /// Write the whole structure back to disk. Called with the data lock held.
    ///
    /// If the write fails, the in-memory counter stays advanced; the gate
    /// stays conservative rather than re-admitting an uncertain request.
    async fn persist(&self, data: &StoreData) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Self::with_timeout(self.io_timeout, tokio::fs::write(&self.path, bytes)).await
    }
}

#[async_trait]
impl AccountRepository for JsonFileStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StorageError> {
        let data = self.data.lock().await;
        data.accounts
            .iter()
            .find(|r| r.email == email.as_str())
            .cloned()
            .map(AccountRecord::into_entity)
            .transpose()
    }

    async fn find_by_id(&self, account_id: &AccountId) -> Result<Option<Account>, StorageError> {
        let data = self.data.lock().await;
        data.accounts
            .iter()
            .find(|r| r.id == account_id.as_uuid())
            .cloned()
            .map(AccountRecord::into_entity)
            .transpose()
    }

    async fn create(&self, account: &Account) -> Result<(), StorageError> {
        let mut data = self.data.lock().await;
        if data
            .accounts
            .iter()
            .any(|r| r.email == account.email.as_str())
        {
            return Err(StorageError::DuplicateEmail);
        }

        data.accounts.push(AccountRecord::from_entity(account));
        self.persist(&data).await
    }

    async fn consume_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<Account>, StorageError> {
        let mut data = self.data.lock().await;
        let record = data
            .accounts
            .iter_mut()
            .find(|r| r.verification_token.as_deref() == Some(token));

        let Some(record) = record else {
            return Ok(None);
        };

        record.verified = true;
        record.verification_token = None;
        record.updated_at = Utc::now();
        let account = record.clone().into_entity()?;

        self.persist(&data).await?;
        Ok(Some(account))
    }

    async fn charge(
        &self,
        account_id: &AccountId,
        policy: &QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, StorageError> {
        let mut data = self.data.lock().await;
        let record = data
            .accounts
            .iter_mut()
            .find(|r| r.id == account_id.as_uuid())
            .ok_or(StorageError::NotFound)?;

        let charge =
            policy.evaluate_account(record.usage_count, record.exhausted_at, record.verified, now);

        let decision = match charge {
            AccountCharge::Admit {
                new_count,
                new_exhausted_at,
                remaining,
            } => {
                record.usage_count = new_count;
                record.exhausted_at = new_exhausted_at;
                record.updated_at = now;
                self.persist(&data).await?;
                GateDecision::Admitted { remaining }
            }
            AccountCharge::Reject {
                error,
                arm_exhausted_at,
            } => {
                if let Some(at) = arm_exhausted_at {
                    record.exhausted_at = Some(at);
                    record.updated_at = now;
                    self.persist(&data).await?;
                }
                GateDecision::Rejected(error)
            }
        };

        Ok(decision)
    }
}

#[async_trait]
impl GuestUsageRepository for JsonFileStore {
    async fn charge(
        &self,
        origin: &str,
        policy: &QuotaPolicy,
    ) -> Result<GateDecision, StorageError> {
        let mut data = self.data.lock().await;
        let count = data.guests.entry(origin.to_string()).or_insert(0);

        match policy.evaluate_guest(*count) {
            GuestCharge::Admit {
                new_count,
                remaining,
            } => {
                *count = new_count;
                self.persist(&data).await?;
                Ok(GateDecision::Admitted { remaining })
            }
            GuestCharge::Reject(error) => Ok(GateDecision::Rejected(error)),
        }
    }
}
