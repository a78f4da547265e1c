//! Extractors that reject with [`crate::AppError`] so failures share the error envelope.

pub mod uuid_path;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
