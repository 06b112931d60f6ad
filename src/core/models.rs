// Request-scoped identity and wire models

use crate::core::errors::ServiceError;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The authenticated identity behind an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
}

/// Caller identity for the duration of one request.
///
/// Owned by the transport layer, read-only to the services. Construction
/// guarantees the invariant: a principal exists only for authenticated
/// callers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    principal: Option<Principal>,
}

impl AuthContext {
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// The verified principal, or `Unauthenticated`.
    pub fn principal(&self) -> Result<&Principal, ServiceError> {
        self.principal
            .as_ref()
            .ok_or(ServiceError::Unauthenticated)
    }
}

/// A derived per-entity symmetric key, base64-encoded.
///
/// Computed on demand, returned, discarded; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey(String);

impl DerivedKey {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group membership record, read from the external document store.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    #[serde(default)]
    pub members: Vec<String>,
}

impl GroupRecord {
    pub fn is_member(&self, uid: &str) -> bool {
        self.members.iter().any(|m| m == uid)
    }
}

/// Payment gateway credentials from configuration.
///
/// The key secret is wrapped so it cannot leak through `Debug` or logging;
/// only the public key id is ever echoed to callers.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: Secret<String>,
}

/// Inbound order-creation request.
///
/// The amount is kept as raw JSON until validation so that the service owns
/// the coercion rules (integer, integral float, or integer-parsing string)
/// and every rejection is a typed `InvalidArgument` rather than a
/// deserializer error.
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    pub amount_minor_units: Option<Value>,
    pub receipt: Option<String>,
}

impl OrderRequest {
    pub fn from_json(body: &Value) -> Self {
        Self {
            amount_minor_units: body
                .get("amountMinorUnits")
                .filter(|v| !v.is_null())
                .cloned(),
            receipt: body
                .get("receipt")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }
}

/// Result of a successful order creation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResult {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "keyId")]
    pub key_id: String,
}
