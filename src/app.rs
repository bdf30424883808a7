//! Application setup and wiring

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::application::auth::use_cases::{
    LoginUseCase, RegisterUseCase, ValidateTokenUseCase, VerifyEmailUseCase,
};
use crate::application::chat::use_cases::SubmitChatUseCase;
use crate::application::quota::use_cases::ChargeQuotaUseCase;
use crate::config::{Config, StoreBackend};
use crate::domain::auth::repositories::{AccountRepository, GuestUsageRepository};
use crate::domain::chat::ChatCompletionClient;
use crate::infrastructure::auth::{JwtService, PasswordHasher, VerificationTokenGenerator};
use crate::infrastructure::email::{BrevoMailer, NoopMailer, VerificationMailer};
use crate::infrastructure::store::{InMemoryStore, JsonFileStore};
use crate::infrastructure::upstream::OpenAIChatClient;
use crate::presentation::middleware::QuotaGateState;
use crate::presentation::{AppState, create_router};

/// Create the application router
pub async fn create_app(
    config: Config,
) -> Result<Router, Box<dyn std::error::Error + Send + Sync>> {
    let config_arc = Arc::new(config.clone());

    // Initialize the persistent store
    let (accounts, guests): (Arc<dyn AccountRepository>, Arc<dyn GuestUsageRepository>) =
        match config.store.backend {
            StoreBackend::Memory => {
                tracing::info!("Using in-memory store");
                let store = Arc::new(InMemoryStore::new());
                (store.clone(), store)
            }
            StoreBackend::JsonFile => {
                let store = Arc::new(
                    JsonFileStore::open(
                        &config.store.path,
                        Duration::from_secs(config.store.io_timeout_seconds),
                    )
                    .await?,
                );
                (store.clone(), store)
            }
        };

    // Initialize auth services
    let jwt_service = Arc::new(JwtService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_hours,
    ));
    let password_hasher = Arc::new(PasswordHasher::new());
    let token_generator = Arc::new(VerificationTokenGenerator::new());

    // Initialize the verification mailer
    let mailer: Arc<dyn VerificationMailer> = if config.mail.enabled {
        tracing::info!("Verification mail enabled via Brevo");
        Arc::new(BrevoMailer::new(&config.mail)?)
    } else {
        tracing::info!("Verification mail disabled; links will be logged only");
        Arc::new(NoopMailer)
    };

    // Initialize the upstream chat client
    let chat_client: Arc<dyn ChatCompletionClient> =
        Arc::new(OpenAIChatClient::new(&config.upstream));
    if config.upstream.api_key.trim().is_empty() {
        tracing::warn!("upstream.api_key is not configured; chat requests will fail");
    }

    // Initialize use cases
    let register_use_case = Arc::new(RegisterUseCase::new(
        accounts.clone(),
        password_hasher.clone(),
        jwt_service.clone(),
        token_generator,
        mailer,
        config.mail.public_base_url.clone(),
    ));
    let login_use_case = Arc::new(LoginUseCase::new(
        accounts.clone(),
        password_hasher,
        jwt_service.clone(),
    ));
    let verify_email_use_case = Arc::new(VerifyEmailUseCase::new(accounts.clone()));
    let validate_token_use_case = Arc::new(ValidateTokenUseCase::new(jwt_service));
    let charge_quota_use_case = Arc::new(ChargeQuotaUseCase::new(
        accounts,
        guests,
        validate_token_use_case,
        config.quota.to_policy(),
    ));
    let submit_chat_use_case = Arc::new(SubmitChatUseCase::new(chat_client));

    let state = AppState {
        register_use_case,
        login_use_case,
        verify_email_use_case,
        submit_chat_use_case,
        token_ttl_hours: config.auth.token_ttl_hours,
    };

    let gate_state = Arc::new(QuotaGateState {
        charge_quota: charge_quota_use_case,
    });

    Ok(create_router(state, gate_state, config_arc))
}
