//! Type-safe error codes for API responses.
//!
//! Each code has a client-facing identifier (`"OUT_OF_STOCK"`), an integer
//! used in structured logs (`1013`) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Missing or invalid input
    ValidationError,

    /// Invalid UUID in a path parameter
    InvalidUuid,

    /// Request body could not be decoded
    JsonExtraction,

    NotFound,

    /// Missing, malformed or expired credentials
    Unauthorized,

    /// Authenticated but lacking the required role
    Forbidden,

    /// Uniqueness violation
    Conflict,

    /// Email/password pair did not match
    InvalidCredentials,

    /// Purchase against an empty stock
    OutOfStock,

    /// Multipart body could not be decoded
    InvalidMultipart,

    // Server errors (1000s)
    InternalError,

    ServiceUnavailable,

    /// An external collaborator (e.g. image host) failed
    UpstreamFailure,

    // I/O errors (4000s)
    IoError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling on the client.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::OutOfStock => "OUT_OF_STOCK",
            Self::InvalidMultipart => "INVALID_MULTIPART",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
            Self::IoError => "IO_ERROR",
        }
    }

    /// Integer code used in structured logs and alerts.
    ///
    /// - 1000-1999: request and domain errors
    /// - 4000-4999: I/O errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::Forbidden => 1007,
            Self::Conflict => 1008,
            Self::ServiceUnavailable => 1011,
            Self::InvalidCredentials => 1012,
            Self::OutOfStock => 1013,
            Self::UpstreamFailure => 1014,
            Self::InvalidMultipart => 1015,
            Self::IoError => 4001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Unauthorized request",
            Self::Forbidden => "Access forbidden",
            Self::Conflict => "Resource already exists",
            Self::InvalidCredentials => "Invalid credentials",
            Self::OutOfStock => "Out of stock",
            Self::InvalidMultipart => "Failed to parse multipart body",
            Self::InternalError => "Internal Server Error",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::UpstreamFailure => "Upstream service failed",
            Self::IoError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
