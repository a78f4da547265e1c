use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const SWEET_EXISTS: &str = "Sweet already exists";
pub const SWEET_NOT_FOUND: &str = "Sweet not found";
pub const OUT_OF_STOCK: &str = "Out of stock";
pub const INVALID_RESTOCK_AMOUNT: &str = "Invalid restock amount";
pub const UPLOAD_FAILED: &str = "Failed to upload image";

#[derive(Debug, Error)]
pub enum SweetError {
    #[error("Sweet not found: {0}")]
    NotFound(Uuid),

    #[error("Sweet with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Sweet {0} is out of stock")]
    OutOfStock(Uuid),

    #[error("Invalid restock amount")]
    InvalidRestockAmount,

    #[error("Image upload failed")]
    UploadFailed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SweetResult<T> = Result<T, SweetError>;

/// Convert SweetError to AppError for standardized error responses
impl From<SweetError> for AppError {
    fn from(err: SweetError) -> Self {
        match err {
            SweetError::NotFound(_) => AppError::NotFound(SWEET_NOT_FOUND.to_string()),
            SweetError::DuplicateName(_) => AppError::Conflict(SWEET_EXISTS.to_string()),
            SweetError::MissingFields => AppError::BadRequest(ALL_FIELDS_REQUIRED.to_string()),
            SweetError::Validation(msg) => AppError::BadRequest(msg),
            SweetError::Invalid(errors) => AppError::ValidationError(errors),
            SweetError::OutOfStock(_) => AppError::OutOfStock(OUT_OF_STOCK.to_string()),
            SweetError::InvalidRestockAmount => {
                AppError::BadRequest(INVALID_RESTOCK_AMOUNT.to_string())
            }
            SweetError::UploadFailed => AppError::UpstreamFailure(UPLOAD_FAILED.to_string()),
            SweetError::Database(msg) => AppError::InternalServerError(msg),
            SweetError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SweetError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for SweetError {
    fn from(err: mongodb::error::Error) -> Self {
        SweetError::Database(err.to_string())
    }
}
