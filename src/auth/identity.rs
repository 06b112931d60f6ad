// Bearer-token verification middleware

use crate::api::responses::ApiError;
use crate::core::errors::ServiceError;
use crate::core::models::{AuthContext, Principal};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct BearerClaims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Verifies HS256 bearer tokens and yields the principal they assert.
pub struct IdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(secret: &Secret<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a token and extract its subject as the principal.
    ///
    /// Every verification failure collapses to `Unauthenticated`. The
    /// reason is logged, never returned, so callers cannot probe token
    /// internals.
    pub fn verify(&self, token: &str) -> Result<Principal, ServiceError> {
        let data =
            decode::<BearerClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                warn!(error = %e, "Bearer token rejected");
                ServiceError::Unauthenticated
            })?;
        Ok(Principal {
            uid: data.claims.sub,
        })
    }
}

/// Identity middleware.
///
/// A missing `Authorization` header produces an anonymous context; the
/// services own the `Unauthenticated` decision. A header that is present
/// but fails verification is rejected here.
pub async fn identity_middleware(
    State(verifier): State<Arc<IdentityVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = match bearer_token(request.headers()) {
        None => AuthContext::anonymous(),
        Some(token) => {
            let principal = verifier
                .verify(&token)
                .map_err(ApiError::from_service_error)?;
            AuthContext::authenticated(principal)
        }
    };

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}
