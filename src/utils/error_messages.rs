//! Messages sent back to clients, and the mapping from service errors to
//! HTTP responses. Internal causes are logged, never returned.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;

use crate::services::ServiceError;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const EMAIL_ALREADY_EXISTS: &str = "Email already exists";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const TOKEN_MISSING: &str = "Access token missing";
pub const TOKEN_INVALID: &str = "Invalid or expired access token";
pub const ACCESS_DENIED: &str = "Access denied";
pub const INTERNAL_ERROR: &str = "Internal server error";

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        ServiceError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServiceError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
            ServiceError::EmailAlreadyExists => (
                StatusCode::BAD_REQUEST,
                json!({ "message": EMAIL_ALREADY_EXISTS }),
            ),
            ServiceError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "message": INVALID_CREDENTIALS }),
            ),
            ServiceError::Unauthenticated(message) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "unauthorized", "message": message }),
            ),
            ServiceError::AccessDenied(_) => {
                (StatusCode::FORBIDDEN, json!({ "message": ACCESS_DENIED }))
            }
            ServiceError::NotFound(message) => {
                (StatusCode::NOT_FOUND, json!({ "message": message }))
            }
            ServiceError::Database(e) => {
                error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": INTERNAL_ERROR }),
                )
            }
            ServiceError::Internal(e) => {
                error!("Internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": INTERNAL_ERROR }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
