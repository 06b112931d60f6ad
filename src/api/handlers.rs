// Request handlers for API endpoints

use axum::{extract::State, http::HeaderMap, response::Json, Extension};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::responses::{ApiError, HealthResponse, KeyResponse};
use crate::api::AppState;
use crate::core::errors::ServiceError;
use crate::core::models::{AuthContext, OrderRequest, OrderResult};

/// POST /v1/keys/user
///
/// Derives the calling user's own encryption key. No body; the entity id is
/// always the authenticated principal.
pub async fn user_key_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<KeyResponse>, ApiError> {
    let request_id = request_id(&headers);

    let key = state
        .keys
        .derive_user_key(&ctx)
        .map_err(|e| reject(e, &request_id))?;

    Ok(Json(KeyResponse {
        key: key.into_inner(),
    }))
}

/// POST /v1/keys/group
///
/// Body: `{ "groupId": "..." }`. Derives the group's key after a membership
/// check against the external store.
pub async fn group_key_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(ctx): Extension<AuthContext>,
    body: Option<Json<Value>>,
) -> Result<Json<KeyResponse>, ApiError> {
    let request_id = request_id(&headers);
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);

    let group_id = body
        .get("groupId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            reject(
                ServiceError::InvalidArgument("groupId is required.".to_string()),
                &request_id,
            )
        })?;

    let key = state
        .keys
        .derive_group_key(&ctx, group_id)
        .await
        .map_err(|e| reject(e, &request_id))?;

    Ok(Json(KeyResponse {
        key: key.into_inner(),
    }))
}

/// POST /v1/orders
///
/// Body: `{ "amountMinorUnits": <integer>, "receipt": "..."? }`. Validates
/// and forwards an order-creation request to the payment gateway.
pub async fn create_order_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(ctx): Extension<AuthContext>,
    body: Option<Json<Value>>,
) -> Result<Json<OrderResult>, ApiError> {
    let request_id = request_id(&headers);
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let req = OrderRequest::from_json(&body);

    let result = state
        .payments
        .create_order(&ctx, &req)
        .await
        .map_err(|e| reject(e, &request_id))?;

    info!(
        request_id = %request_id,
        order_id = %result.order_id,
        "Order created"
    );

    Ok(Json(result))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Extract request ID from headers or generate one
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn reject(err: ServiceError, request_id: &str) -> ApiError {
    warn!(
        request_id = %request_id,
        code = err.code(),
        error = %err,
        "Request rejected"
    );
    ApiError::from_service_error_with_id(err, request_id.to_string())
}
