pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// Error envelope returned for every failed request.
///
/// ```json
/// {
///   "success": false,
///   "code": 1013,
///   "error": "OUT_OF_STOCK",
///   "message": "Out of stock",
///   "errors": [],
///   "data": null
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured per-field problems, empty unless validation failed
    #[serde(default)]
    pub errors: Vec<Value>,
    /// Always `null`
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            errors: Vec::new(),
            data: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<Value>) -> Self {
        self.errors = errors;
        self
    }
}

/// Application error type rendered as an [`ErrorResponse`].
///
/// Domain crates convert their own error enums into this at the API boundary.
/// Classified variants carry a client-safe message. `InternalServerError` and
/// `Io` details are logged and replaced by a generic message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Multipart extraction error: {0}")]
    MultipartRejection(#[from] MultipartRejection),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    /// Missing or invalid input
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    /// Uniqueness violation. Reported as 400 like other input problems.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Io(_)
            | AppError::InternalServerError(_)
            | AppError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::JsonExtractorRejection(_)
            | AppError::MultipartRejection(_)
            | AppError::Multipart(_)
            | AppError::ValidationError(_)
            | AppError::UuidError(_)
            | AppError::BadRequest(_)
            | AppError::InvalidCredentials(_)
            | AppError::OutOfStock(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Io(_) => ErrorCode::IoError,
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::MultipartRejection(_) | AppError::Multipart(_) => ErrorCode::InvalidMultipart,
            AppError::ValidationError(_) | AppError::BadRequest(_) => ErrorCode::ValidationError,
            AppError::UuidError(_) => ErrorCode::InvalidUuid,
            AppError::InvalidCredentials(_) => ErrorCode::InvalidCredentials,
            AppError::OutOfStock(_) => ErrorCode::OutOfStock,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::UpstreamFailure(_) => ErrorCode::UpstreamFailure,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

/// Flattens validator output into `[{ field, code, message }]`.
pub fn validation_error_list(errors: &ValidationErrors) -> Vec<Value> {
    let mut list: Vec<Value> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |err| {
                json!({
                    "field": field,
                    "code": err.code,
                    "message": err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
        })
        .collect();
    // HashMap iteration order is unstable
    list.sort_by(|a, b| a["field"].as_str().cmp(&b["field"].as_str()));
    list
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();
        let error_code = code.code();

        let (message, errors) = match self {
            AppError::Io(e) => {
                tracing::error!(error_code, error = ?e, "I/O error");
                (code.default_message().to_string(), Vec::new())
            }
            AppError::InternalServerError(detail) => {
                tracing::error!(error_code, %detail, "Internal server error");
                (code.default_message().to_string(), Vec::new())
            }
            AppError::UpstreamFailure(msg) => {
                tracing::error!(error_code, "Upstream failure: {}", msg);
                (msg, Vec::new())
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(error_code, "Service unavailable: {}", msg);
                (msg, Vec::new())
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code, "JSON extraction error: {}", e);
                (e.body_text(), Vec::new())
            }
            AppError::MultipartRejection(e) => {
                tracing::warn!(error_code, "Multipart rejection: {}", e);
                (e.body_text(), Vec::new())
            }
            AppError::Multipart(e) => {
                tracing::warn!(error_code, "Multipart error: {}", e);
                (e.body_text(), Vec::new())
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code, "Validation error: {}", e);
                (
                    code.default_message().to_string(),
                    validation_error_list(&e),
                )
            }
            AppError::UuidError(e) => {
                tracing::info!(error_code, "UUID error: {}", e);
                (code.default_message().to_string(), Vec::new())
            }
            AppError::BadRequest(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::OutOfStock(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => {
                tracing::info!(error_code, status = status.as_u16(), "{}", msg);
                (msg, Vec::new())
            }
        };

        let body = ErrorResponse::new(code, message).with_errors(errors);
        (status, Json(body)).into_response()
    }
}

/// Build an error response without going through [`AppError`].
pub fn error_response(status: StatusCode, message: impl Into<String>, code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}
