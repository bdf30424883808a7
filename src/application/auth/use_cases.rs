//! Authentication use cases

use std::sync::Arc;

use crate::application::errors::ApplicationError;
use crate::domain::auth::{
    entities::Account,
    errors::{AuthError, StorageError},
    repositories::AccountRepository,
    value_objects::{AccountId, Email},
};
use crate::infrastructure::auth::{JwtService, PasswordHasher, VerificationTokenGenerator};
use crate::infrastructure::email::VerificationMailer;

/// Result type for login operations
pub struct LoginResult {
    pub token: String,
    pub account_id: AccountId,
    pub email: Email,
}

/// Result of successful registration
pub struct RegisterResult {
    pub account_id: AccountId,
    pub token: String,
}

/// Use case for registering new accounts
pub struct RegisterUseCase {
    accounts: Arc<dyn AccountRepository>,
    password_hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
    token_generator: Arc<VerificationTokenGenerator>,
    mailer: Arc<dyn VerificationMailer>,
    public_base_url: String,
}

impl RegisterUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        password_hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
        token_generator: Arc<VerificationTokenGenerator>,
        mailer: Arc<dyn VerificationMailer>,
        public_base_url: String,
    ) -> Self {
        Self {
            accounts,
            password_hasher,
            jwt_service,
            token_generator,
            mailer,
            public_base_url,
        }
    }

    pub async fn execute(
        &self,
        email: Email,
        password: String,
    ) -> Result<RegisterResult, ApplicationError> {
        if password.is_empty() {
            return Err(AuthError::MissingFields.into());
        }

        // Check for an existing registration before doing any work
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateIdentity {
                email: email.as_str().to_string(),
            }
            .into());
        }

        let password_hash = self.password_hasher.hash(password).await?;
        let verification_token = self.token_generator.generate();

        let account = Account::new(
            AccountId::generate(),
            email,
            password_hash,
            verification_token.clone(),
        );

        // The store enforces uniqueness again under its lock, so a racing
        // duplicate registration still fails without mutating anything.
        match self.accounts.create(&account).await {
            Err(StorageError::DuplicateEmail) => {
                return Err(AuthError::DuplicateIdentity {
                    email: account.email.as_str().to_string(),
                }
                .into());
            }
            other => other?,
        }

        self.dispatch_verification_email(&account, &verification_token);

        let token = self
            .jwt_service
            .generate_token(account.account_id, account.email.clone())?;

        Ok(RegisterResult {
            account_id: account.account_id,
            token,
        })
    }

    /// Dispatch the verification email as a detached task.
    ///
    /// The request path never awaits the send; a failure is logged by the
    /// task itself and must not fail registration.
    fn dispatch_verification_email(&self, account: &Account, verification_token: &str) {
        let mailer = self.mailer.clone();
        let to = account.email.clone();
        let verify_url = format!(
            "{}/api/verify?token={}",
            self.public_base_url.trim_end_matches('/'),
            verification_token
        );

        tokio::spawn(async move {
            if let Err(e) = mailer.send_verification(&to, &verify_url).await {
                tracing::warn!(email = %to, error = %e, "Failed to send verification email");
            }
        });
    }
}

/// Use case for logging in
pub struct LoginUseCase {
    accounts: Arc<dyn AccountRepository>,
    password_hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
}

impl LoginUseCase {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        password_hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            accounts,
            password_hasher,
            jwt_service,
        }
    }

    pub async fn execute(
        &self,
        email: Email,
        password: String,
    ) -> Result<LoginResult, ApplicationError> {
        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = self
            .password_hasher
            .verify(password, account.password_hash.clone())
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self
            .jwt_service
            .generate_token(account.account_id, account.email.clone())?;

        Ok(LoginResult {
            token,
            account_id: account.account_id,
            email: account.email,
        })
    }
}

/// Use case for consuming an email-verification token
pub struct VerifyEmailUseCase {
    accounts: Arc<dyn AccountRepository>,
}

impl VerifyEmailUseCase {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    pub async fn execute(&self, token: &str) -> Result<(), ApplicationError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken.into());
        }

        let account = self
            .accounts
            .consume_verification_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        tracing::info!(account_id = %account.account_id, "Email verified");
        Ok(())
    }
}

/// Use case for validating bearer tokens
pub struct ValidateTokenUseCase {
    jwt_service: Arc<JwtService>,
}

impl ValidateTokenUseCase {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }

    pub fn execute(&self, token: &str) -> Result<(AccountId, Email), AuthError> {
        let claims = self.jwt_service.validate_token(token)?;

        let account_id = claims.account_id().map_err(|_| AuthError::InvalidToken)?;
        let email = Email::new(claims.email).map_err(|_| AuthError::InvalidToken)?;

        Ok((account_id, email))
    }
}
