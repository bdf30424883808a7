//! Shared test fixtures: an app wired over the in-memory store with a mock
//! upstream client and a capturing mailer.

// Not every test binary exercises every fixture
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use tokio::sync::Mutex;
use tower::ServiceExt;

use jurisai::application::auth::use_cases::{
    LoginUseCase, RegisterUseCase, ValidateTokenUseCase, VerifyEmailUseCase,
};
use jurisai::application::chat::use_cases::SubmitChatUseCase;
use jurisai::application::quota::use_cases::ChargeQuotaUseCase;
use jurisai::config::Config;
use jurisai::domain::chat::{ChatCompletionClient, ChatMessage, UpstreamError};
use jurisai::infrastructure::auth::{JwtService, PasswordHasher, VerificationTokenGenerator};
use jurisai::infrastructure::email::{MailError, VerificationMailer};
use jurisai::infrastructure::store::InMemoryStore;
use jurisai::presentation::middleware::QuotaGateState;
use jurisai::presentation::{AppState, create_router};

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";

/// Upstream client returning a canned reply
pub struct MockChatClient {
    pub reply: String,
}

#[async_trait]
impl ChatCompletionClient for MockChatClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, UpstreamError> {
        Ok(self.reply.clone())
    }
}

/// Mailer that records every dispatch instead of sending
#[derive(Default)]
pub struct CaptureMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl VerificationMailer for CaptureMailer {
    async fn send_verification(
        &self,
        to: &jurisai::domain::auth::value_objects::Email,
        verify_url: &str,
    ) -> Result<(), MailError> {
        self.sent
            .lock()
            .await
            .push((to.as_str().to_string(), verify_url.to_string()));
        Ok(())
    }
}

/// Fully wired test application
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<CaptureMailer>,
    pub jwt_service: Arc<JwtService>,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.enable_docs = false;

        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(CaptureMailer::default());
        let jwt_service = Arc::new(JwtService::new(
            TEST_JWT_SECRET.to_string(),
            config.auth.token_ttl_hours,
        ));
        // Low-cost hashing parameters keep the suite fast
        let password_hasher = Arc::new(PasswordHasher::with_params(4096, 1, 1));
        let token_generator = Arc::new(VerificationTokenGenerator::new());

        let register_use_case = Arc::new(RegisterUseCase::new(
            store.clone(),
            password_hasher.clone(),
            jwt_service.clone(),
            token_generator,
            mailer.clone(),
            "http://localhost:3000".to_string(),
        ));
        let login_use_case = Arc::new(LoginUseCase::new(
            store.clone(),
            password_hasher,
            jwt_service.clone(),
        ));
        let verify_email_use_case = Arc::new(VerifyEmailUseCase::new(store.clone()));
        let validate_token_use_case = Arc::new(ValidateTokenUseCase::new(jwt_service.clone()));
        let charge_quota_use_case = Arc::new(ChargeQuotaUseCase::new(
            store.clone(),
            store.clone(),
            validate_token_use_case,
            config.quota.to_policy(),
        ));
        let submit_chat_use_case = Arc::new(SubmitChatUseCase::new(Arc::new(MockChatClient {
            reply: "Mock legal analysis.".to_string(),
        })));

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

        let router = create_router(state, gate_state, Arc::new(config));

        Self {
            router,
            store,
            mailer,
            jwt_service,
        }
    }

    /// Send a request through the router
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// POST a JSON body
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST to the chat endpoint as a guest from the given origin
    pub async fn chat_as_guest(&self, origin: &str) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .header("x-forwarded-for", origin)
                .body(Body::from(chat_body().to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST to the chat endpoint with a bearer token
    pub async fn chat_with_token(&self, token: &str) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::from(chat_body().to_string()))
                .unwrap(),
        )
        .await
    }

    /// Sign up and return the bearer token from the response
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/signup",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let json = json_body(response).await;
        json["token"].as_str().unwrap().to_string()
    }

    /// Read the stored verification token for an email
    pub async fn verification_token(&self, email: &str) -> String {
        use jurisai::domain::auth::repositories::AccountRepository;
        use jurisai::domain::auth::value_objects::Email;

        let account = self
            .store
            .find_by_email(&Email::new(email.to_string()).unwrap())
            .await
            .unwrap()
            .expect("account not found");
        account
            .verification_token
            .expect("no pending verification token")
    }
}

/// A minimal valid chat request body
pub fn chat_body() -> serde_json::Value {
    serde_json::json!({
        "messages": [
            { "role": "user", "content": "What is the limitation period for a civil suit?" }
        ]
    })
}

/// Read a response body as JSON
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
