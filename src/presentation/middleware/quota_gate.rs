//! Request gate middleware
//!
//! Runs ahead of the guarded chat endpoint. Classifies the caller (bearer
//! token vs network origin), charges the quota ledger through the store's
//! serialized charge operation, and either passes the request through or
//! rejects it before the expensive upstream call. Storage failures reject
//! the request; nothing is admitted on uncertainty.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::errors::ApplicationError;
use crate::application::quota::use_cases::ChargeQuotaUseCase;
use crate::domain::auth::errors::AuthError;
use crate::domain::quota::{GateDecision, QuotaError};
use crate::presentation::models::ErrorResponse;

/// State for the quota gate middleware
pub struct QuotaGateState {
    pub charge_quota: Arc<ChargeQuotaUseCase>,
}

/// Quota gate middleware
pub async fn quota_gate_middleware(
    State(state): State<Arc<QuotaGateState>>,
    request: Request,
    next: Next,
) -> Response {
    let bearer = bearer_token(&request);

    let decision = match bearer {
        Some(token) => state.charge_quota.charge_bearer(&token).await,
        None => {
            let origin = client_origin(&request);
            state.charge_quota.charge_guest(&origin).await
        }
    };

    match decision {
        Ok(GateDecision::Admitted { remaining }) => {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert("x-quota-remaining", HeaderValue::from(remaining));
            response
        }
        Ok(GateDecision::Rejected(error)) => quota_rejection(error),
        Err(ApplicationError::Authentication(error)) => auth_rejection(error),
        Err(error) => {
            tracing::error!(error = %error, "Quota charge failed; rejecting request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "INTERNAL_ERROR",
                    "Server error. Please try again.",
                )),
            )
                .into_response()
        }
    }
}

/// Extract the bearer credential from the Authorization header, if present
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Resolve the caller's network origin for the anonymous path.
///
/// Proxy headers win over the socket peer address: first hop of
/// `x-forwarded-for`, then `x-real-ip`, then the connection itself.
fn client_origin(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        })
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown-ip".to_string())
}

fn quota_rejection(error: QuotaError) -> Response {
    let (code, details) = match &error {
        QuotaError::QuotaExhausted {
            retry_after_seconds,
        } => (
            "QUOTA_EXHAUSTED",
            Some(serde_json::json!({ "retry_after": retry_after_seconds })),
        ),
        QuotaError::VerificationRequired => ("VERIFICATION_REQUIRED", None),
        QuotaError::GuestLimitExhausted => ("GUEST_LIMIT_EXHAUSTED", None),
    };

    tracing::warn!(code = code, "Request rejected by quota gate");

    let mut body = ErrorResponse::new(code, error.to_string());
    if let Some(details) = details {
        body = body.with_details(details);
    }

    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

fn auth_rejection(error: AuthError) -> Response {
    let code = match error {
        AuthError::TokenExpired => "TOKEN_EXPIRED",
        _ => "INVALID_TOKEN",
    };

    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(code, error.to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_bearer_token_extraction() {
        let request = Request::builder()
            .header("authorization", "Bearer abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), Some("abc.def.ghi".to_string()));

        let request = Request::builder()
            .header("authorization", "ApiKey xyz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), None);

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&request), None);
    }

    #[test]
    fn test_client_origin_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "1.2.3.4, 10.0.0.1")
            .header("x-real-ip", "5.6.7.8")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_origin(&request), "1.2.3.4");
    }

    #[test]
    fn test_client_origin_falls_back_to_real_ip() {
        let request = Request::builder()
            .header("x-real-ip", "5.6.7.8")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_origin(&request), "5.6.7.8");
    }

    #[test]
    fn test_client_origin_unknown_without_headers() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_origin(&request), "unknown-ip");
    }
}
