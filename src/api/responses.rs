// Response types for API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response for both key-derivation endpoints
#[derive(Debug, Serialize)]
pub struct KeyResponse {
    pub key: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error detail: stable machine code plus human-readable message
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// API error type that converts domain errors to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    /// Create from a ServiceError
    pub fn from_service_error(err: crate::core::errors::ServiceError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            code: err.code().to_string(),
            message: err.user_message(),
            request_id: None,
        }
    }

    /// Create from a ServiceError with request ID
    pub fn from_service_error_with_id(
        err: crate::core::errors::ServiceError,
        request_id: String,
    ) -> Self {
        let mut api_error = Self::from_service_error(err);
        api_error.request_id = Some(request_id);
        api_error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
            request_id: self.request_id,
        });
        (self.status, body).into_response()
    }
}

impl From<crate::core::errors::ServiceError> for ApiError {
    fn from(err: crate::core::errors::ServiceError) -> Self {
        ApiError::from_service_error(err)
    }
}
