// Unit tests for the key derivation service

use crate::common::{authed, MockGroupStore};
use expenso_backend::core::errors::ServiceError;
use expenso_backend::core::models::AuthContext;
use expenso_backend::core::secret::MasterSecret;
use expenso_backend::keys::KeyDerivationService;
use std::sync::Arc;

fn service(master: Option<&str>, store: MockGroupStore) -> KeyDerivationService {
    KeyDerivationService::new(
        master.map(|m| MasterSecret::parse(m).unwrap()),
        Arc::new(store),
    )
}

#[test]
fn test_user_key_requires_authentication() {
    let svc = service(Some("test_master_key"), MockGroupStore::default());

    let err = svc.derive_user_key(&AuthContext::anonymous()).unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated));
}

#[test]
fn test_user_key_requires_master_secret() {
    let svc = service(None, MockGroupStore::default());

    let err = svc.derive_user_key(&authed("u_123")).unwrap_err();
    assert!(matches!(err, ServiceError::PreconditionFailed(_)));
}

#[test]
fn test_user_key_is_deterministic() {
    let svc = service(Some("test_master_key"), MockGroupStore::default());
    let ctx = authed("u_123");

    let first = svc.derive_user_key(&ctx).unwrap();
    let second = svc.derive_user_key(&ctx).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.as_str(), "p/v5S4tEwv/55TLcBnHsXHJQeAfOPJyKdMMA3Ha0U0k=");
}

#[tokio::test]
async fn test_user_and_group_keys_differ_for_same_id() {
    // A group whose id collides with a user id must still get its own key
    let svc = service(
        Some("test_master_key"),
        MockGroupStore::with_group("same_id", &["same_id"]),
    );
    let ctx = authed("same_id");

    let user_key = svc.derive_user_key(&ctx).unwrap();
    let group_key = svc.derive_group_key(&ctx, "same_id").await.unwrap();

    assert_ne!(user_key, group_key);
}

#[tokio::test]
async fn test_group_key_requires_authentication() {
    let svc = service(
        Some("test_master_key"),
        MockGroupStore::with_group("g_123", &["u_123"]),
    );

    let err = svc
        .derive_group_key(&AuthContext::anonymous(), "g_123")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated));
}

#[tokio::test]
async fn test_group_key_rejects_whitespace_id_before_lookup() {
    // A failing store proves the whitespace check happens first
    let svc = service(Some("test_master_key"), MockGroupStore::failing());

    let err = svc
        .derive_group_key(&authed("u_123"), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_group_key_unknown_group() {
    let svc = service(Some("test_master_key"), MockGroupStore::default());

    let err = svc
        .derive_group_key(&authed("u_123"), "g_missing")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_group_key_denied_for_non_member() {
    let svc = service(
        Some("test_master_key"),
        MockGroupStore::with_group("g_123", &["u_other"]),
    );

    let err = svc
        .derive_group_key(&authed("u_123"), "g_123")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_group_key_for_member() {
    let svc = service(
        Some("test_master_key"),
        MockGroupStore::with_group("g_123", &["u_123", "u_456"]),
    );

    let key = svc.derive_group_key(&authed("u_123"), "g_123").await.unwrap();
    assert_eq!(key.as_str(), "pQ0BEMa+/lCJ66hDRtPLIJhoBAnGoV6oNL5yHrjVpKk=");
}

#[tokio::test]
async fn test_group_id_is_trimmed() {
    let svc = service(
        Some("test_master_key"),
        MockGroupStore::with_group("g_123", &["u_123"]),
    );
    let ctx = authed("u_123");

    let padded = svc.derive_group_key(&ctx, "  g_123  ").await.unwrap();
    let plain = svc.derive_group_key(&ctx, "g_123").await.unwrap();

    assert_eq!(padded, plain);
}

#[tokio::test]
async fn test_group_key_missing_secret_after_membership_check() {
    // Membership is still enforced first; the secret check comes last
    let svc = service(None, MockGroupStore::with_group("g_123", &["u_123"]));

    let member_err = svc
        .derive_group_key(&authed("u_123"), "g_123")
        .await
        .unwrap_err();
    assert!(matches!(member_err, ServiceError::PreconditionFailed(_)));

    let outsider_err = svc
        .derive_group_key(&authed("u_999"), "g_123")
        .await
        .unwrap_err();
    assert!(matches!(outsider_err, ServiceError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_store_failure_is_surfaced() {
    let svc = service(Some("test_master_key"), MockGroupStore::failing());

    let err = svc
        .derive_group_key(&authed("u_123"), "g_123")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_hex_and_utf8_secrets_are_distinct_keys() {
    // A hex-shaped secret is decoded; the same characters as UTF-8 would
    // derive something else entirely
    let hex64 = "0abcdef0123456789abcdef0123456789abcdef0123456789abcdef012345678";
    let svc_hex = service(Some(hex64), MockGroupStore::default());
    let svc_raw = service(Some("test_master_key"), MockGroupStore::default());

    let ctx = authed("u_1");
    assert_ne!(
        svc_hex.derive_user_key(&ctx).unwrap(),
        svc_raw.derive_user_key(&ctx).unwrap()
    );
}
