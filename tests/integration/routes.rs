// Route-level tests: full router with identity middleware and mock collaborators

use crate::common::{test_credentials, MockGateway, MockGroupStore};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use expenso_backend::api::{create_router, AppState};
use expenso_backend::auth::IdentityVerifier;
use expenso_backend::config::Config;
use expenso_backend::core::secret::MasterSecret;
use expenso_backend::keys::KeyDerivationService;
use expenso_backend::payments::PaymentOrderService;
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::Secret;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const JWT_SECRET: &str = "test_jwt_secret";

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: usize,
}

fn token_for(uid: &str) -> String {
    encode(
        &Header::default(),
        &TestClaims {
            sub: uid.to_string(),
            exp: 4102444800, // 2100-01-01
        },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn test_app(store: MockGroupStore, gateway: MockGateway) -> Router {
    let config = Config::test_config();

    let keys = Arc::new(KeyDerivationService::new(
        Some(MasterSecret::parse("test_master_key").unwrap()),
        Arc::new(store),
    ));
    let payments = Arc::new(PaymentOrderService::new(
        Some(test_credentials()),
        Arc::new(gateway),
        config.order_max_minor_units,
        config.receipt_prefix.clone(),
    ));

    let app_state = AppState {
        keys,
        payments,
        config: Arc::new(config),
    };
    let verifier = Arc::new(IdentityVerifier::new(&Secret::new(JWT_SECRET.to_string())));

    create_router(app_state, verifier)
}

fn post(uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_user_key_without_token_is_unauthenticated() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post("/v1/keys/user", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn test_user_key_with_invalid_token_rejected() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post("/v1/keys/user", Some("garbage.token.here"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_key_round_trip() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post("/v1/keys/user", Some(&token_for("u_123")), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["key"], "p/v5S4tEwv/55TLcBnHsXHJQeAfOPJyKdMMA3Ha0U0k=");
}

#[tokio::test]
async fn test_group_key_round_trip() {
    let app = test_app(
        MockGroupStore::with_group("g_123", &["u_123"]),
        MockGateway::default(),
    );

    let response = app
        .oneshot(post(
            "/v1/keys/group",
            Some(&token_for("u_123")),
            Some(json!({"groupId": "g_123"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["key"], "pQ0BEMa+/lCJ66hDRtPLIJhoBAnGoV6oNL5yHrjVpKk=");
}

#[tokio::test]
async fn test_group_key_missing_group_id() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post(
            "/v1/keys/group",
            Some(&token_for("u_123")),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "invalid-argument");
}

#[tokio::test]
async fn test_group_key_unknown_group_is_404() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post(
            "/v1/keys/group",
            Some(&token_for("u_123")),
            Some(json!({"groupId": "g_missing"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "not-found");
}

#[tokio::test]
async fn test_group_key_non_member_is_403() {
    let app = test_app(
        MockGroupStore::with_group("g_123", &["someone_else"]),
        MockGateway::default(),
    );

    let response = app
        .oneshot(post(
            "/v1/keys/group",
            Some(&token_for("u_123")),
            Some(json!({"groupId": "g_123"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "permission-denied");
}

#[tokio::test]
async fn test_create_order_round_trip() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post(
            "/v1/orders",
            Some(&token_for("u_123")),
            Some(json!({"amountMinorUnits": 2500})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["orderId"], "order_test_1");
    assert_eq!(body["keyId"], "rzp_test_key");
    assert!(body.get("keySecret").is_none());
}

#[tokio::test]
async fn test_create_order_amount_too_small() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post(
            "/v1/orders",
            Some(&token_for("u_123")),
            Some(json!({"amountMinorUnits": 99})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "invalid-argument");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains(">= 100"));
}

#[tokio::test]
async fn test_create_order_without_body_is_invalid_argument() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let response = app
        .oneshot(post("/v1/orders", Some(&token_for("u_123")), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_order_gateway_down_is_502() {
    let app = test_app(MockGroupStore::default(), MockGateway::failing());

    let response = app
        .oneshot(post(
            "/v1/orders",
            Some(&token_for("u_123")),
            Some(json!({"amountMinorUnits": 100})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "unavailable");
}

#[tokio::test]
async fn test_request_id_echoed_in_errors() {
    let app = test_app(MockGroupStore::default(), MockGateway::default());

    let mut request = post("/v1/keys/user", None, None);
    request
        .headers_mut()
        .insert("x-request-id", "req-echo-1".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    let body = response_json(response).await;
    assert_eq!(body["request_id"], "req-echo-1");
}
