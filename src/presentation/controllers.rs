//! Request handlers and shared application state

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;

use crate::application::auth::use_cases::{LoginUseCase, RegisterUseCase, VerifyEmailUseCase};
use crate::application::chat::use_cases::SubmitChatUseCase;
use crate::domain::chat::UpstreamError;
use crate::presentation::models::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

/// Shared state wired into every handler
#[derive(Clone)]
pub struct AppState {
    pub register_use_case: Arc<RegisterUseCase>,
    pub login_use_case: Arc<LoginUseCase>,
    pub verify_email_use_case: Arc<VerifyEmailUseCase>,
    pub submit_chat_use_case: Arc<SubmitChatUseCase>,
    pub token_ttl_hours: u64,
}

/// Guarded chat endpoint.
///
/// The quota gate middleware runs before this handler; by the time the
/// request arrives here it has already been admitted and charged.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Malformed conversation", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Quota exhausted", body = ErrorResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse)
    ),
    security(
        ("Bearer" = [])
    )
)]
pub async fn submit_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let messages = request.to_domain().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("INVALID_CONVERSATION", e)),
        )
    })?;

    let result = state
        .submit_chat_use_case
        .execute(&messages)
        .await
        .map_err(|e| {
            let (status, code, message) = match &e {
                UpstreamError::RateLimited { .. } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "UPSTREAM_RATE_LIMITED",
                    "Rate limit exceeded. Please wait a moment and try again.",
                ),
                UpstreamError::Timeout { .. } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "The AI service took too long to respond. Please try again.",
                ),
                _ => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Server error. Please try again.",
                ),
            };

            tracing::error!(error = %e, "Upstream chat call failed");
            (status, Json(ErrorResponse::new(code, message)))
        })?;

    Ok(Json(ChatResponse { result }))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
