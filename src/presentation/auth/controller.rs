//! Authentication controller endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Json, Redirect},
};

use crate::application::errors::ApplicationError;
use crate::domain::auth::{errors::AuthError, value_objects::Email};
use crate::presentation::auth::models::*;
use crate::presentation::controllers::AppState;
use crate::presentation::models::ErrorResponse;

/// Signup endpoint
#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Registration successful", body = TokenResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(
                "MISSING_FIELDS",
                AuthError::MissingFields.to_string(),
            )),
        ));
    }

    let email = Email::new(request.email).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("INVALID_EMAIL", e)),
        )
    })?;

    let result = state
        .register_use_case
        .execute(email, request.password)
        .await
        .map_err(|e| {
            let status = match &e {
                ApplicationError::Authentication(AuthError::DuplicateIdentity { .. }) => {
                    StatusCode::CONFLICT
                }
                ApplicationError::Authentication(AuthError::MissingFields) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "Registration failed");
            }

            (
                status,
                Json(ErrorResponse::new("REGISTRATION_FAILED", e.to_string())),
            )
        })?;

    Ok(Json(TokenResponse {
        token: result.token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_ttl_hours * 3600,
    }))
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(
                "MISSING_FIELDS",
                AuthError::MissingFields.to_string(),
            )),
        ));
    }

    let email = Email::new(request.email).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("INVALID_EMAIL", e)),
        )
    })?;

    let result = state
        .login_use_case
        .execute(email, request.password)
        .await
        .map_err(|e| {
            let status = match &e {
                ApplicationError::Authentication(AuthError::InvalidCredentials) => {
                    StatusCode::UNAUTHORIZED
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "Login failed");
            }

            (
                status,
                Json(ErrorResponse::new("LOGIN_FAILED", e.to_string())),
            )
        })?;

    Ok(Json(TokenResponse {
        token: result.token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_ttl_hours * 3600,
    }))
}

/// Verification-consumption endpoint.
///
/// Linked from the verification email; redirects back into the app on
/// success, plain error text otherwise.
#[utoipa::path(
    get,
    path = "/api/verify",
    tag = "auth",
    params(
        ("token" = String, Query, description = "Single-use verification token")
    ),
    responses(
        (status = 303, description = "Email verified; redirect back to the app"),
        (status = 400, description = "Unknown or already-consumed token")
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Redirect, (StatusCode, String)> {
    match state.verify_email_use_case.execute(&params.token).await {
        Ok(()) => Ok(Redirect::to("/?verified=1")),
        Err(ApplicationError::Authentication(AuthError::InvalidToken)) => Err((
            StatusCode::BAD_REQUEST,
            "Invalid or expired verification link.".to_string(),
        )),
        Err(e) => {
            tracing::error!(error = %e, "Verification failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Verification failed. Please try again.".to_string(),
            ))
        }
    }
}
