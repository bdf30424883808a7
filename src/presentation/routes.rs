//! Route definitions and router assembly

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::presentation::{
    auth::controller::{login, signup, verify_email},
    auth::models::*,
    controllers::{AppState, health_check, submit_chat},
    middleware::{QuotaGateState, quota_gate_middleware},
    models::*,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::auth::controller::signup,
        crate::presentation::auth::controller::login,
        crate::presentation::auth::controller::verify_email,
        crate::presentation::controllers::submit_chat,
        crate::presentation::controllers::health_check
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        TokenResponse,
        VerifyParams,
        ChatRequest,
        ChatMessageDto,
        ChatResponse,
        ErrorResponse,
        HealthResponse
    )),
    tags(
        (name = "auth", description = "Signup, login, and email verification"),
        (name = "chat", description = "The gated AI proxy endpoint"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

/// Assemble the application router.
///
/// The quota gate is layered on the chat route only; signup, login, and
/// verification stay reachable for exhausted callers.
pub fn create_router(
    state: AppState,
    gate_state: Arc<QuotaGateState>,
    config: Arc<Config>,
) -> Router {
    let gated = Router::new()
        .route("/api/chat", post(submit_chat))
        .route_layer(middleware::from_fn_with_state(
            gate_state,
            quota_gate_middleware,
        ));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/verify", get(verify_email))
        .merge(gated);

    if config.server.enable_docs {
        router = router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_seconds,
                ))),
        )
        .with_state(state)
}
