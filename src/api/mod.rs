// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod handlers;
pub mod responses;

use crate::auth::{identity_middleware, IdentityVerifier};
use crate::config::Config;
use crate::keys::KeyDerivationService;
use crate::payments::PaymentOrderService;

/// Application state containing all shared dependencies
///
/// All components are wrapped in Arc for shared ownership across async
/// tasks; none of them is mutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<KeyDerivationService>,
    pub payments: Arc<PaymentOrderService>,
    pub config: Arc<Config>,
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Request timeout (tower::timeout) behind HandleErrorLayer
/// - Tracing (tower-http::trace)
/// - Body size limit (tower-http::limit)
/// - Identity middleware (applied per route; `/health` bypasses it)
pub fn create_router(app_state: AppState, verifier: Arc<IdentityVerifier>) -> Router {
    let router = Router::new()
        .route("/v1/keys/user", post(handlers::user_key_handler))
        .route("/v1/keys/group", post(handlers::group_key_handler))
        .route("/v1/orders", post(handlers::create_order_handler))
        .route("/health", get(handlers::health_handler));

    let router = router.route_layer(axum::middleware::from_fn_with_state(
        verifier,
        |state: State<Arc<IdentityVerifier>>, request: Request, next: Next| async move {
            // Liveness probes carry no identity
            if request.uri().path() == "/health" {
                return Ok(next.run(request).await);
            }
            identity_middleware(state, request, next).await
        },
    ));

    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    let router = router.layer(RequestBodyLimitLayer::new(body_limit));

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let middleware_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    router
        .layer(TraceLayer::new_for_http())
        .layer(middleware_stack)
        .with_state(app_state)
}
