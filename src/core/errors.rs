// Domain error types - every caller-visible failure is one typed kind

use thiserror::Error;

/// Main error type for the backend services.
///
/// The first six variants are the caller-visible taxonomy; `Internal` covers
/// infrastructure faults (document-store transport failures, crypto init)
/// that are not any caller's fault and carry no recovery path.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No verified caller identity (HTTP 401)
    #[error("Must be signed in.")]
    Unauthenticated,

    /// Malformed or out-of-policy input (HTTP 400)
    #[error("{0}")]
    InvalidArgument(String),

    /// Referenced entity does not exist (HTTP 404)
    #[error("{0}")]
    NotFound(String),

    /// Authenticated caller is not allowed to access the entity (HTTP 403)
    #[error("{0}")]
    PermissionDenied(String),

    /// Required configuration is absent (HTTP 412)
    #[error("{0}")]
    PreconditionFailed(String),

    /// External payment gateway call failed (HTTP 502)
    #[error("Gateway error: {0}")]
    GatewayUnavailable(String),

    /// Infrastructure fault (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthenticated => 401,
            ServiceError::InvalidArgument(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::PermissionDenied(_) => 403,
            ServiceError::PreconditionFailed(_) => 412,
            ServiceError::GatewayUnavailable(_) => 502,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Get the stable, machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated => "unauthenticated",
            ServiceError::InvalidArgument(_) => "invalid-argument",
            ServiceError::NotFound(_) => "not-found",
            ServiceError::PermissionDenied(_) => "permission-denied",
            ServiceError::PreconditionFailed(_) => "failed-precondition",
            ServiceError::GatewayUnavailable(_) => "unavailable",
            ServiceError::Internal(_) => "internal",
        }
    }

    /// Get user-friendly error message (no sensitive information)
    ///
    /// Gateway and internal errors carry upstream detail for logs; callers
    /// only ever see a generic message for those kinds.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::GatewayUnavailable(_) => "Payment gateway unavailable.".to_string(),
            ServiceError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}
