//! Sweets Domain
//!
//! The sweet inventory and the `/sweets` endpoints.
//!
//! # Features
//!
//! - Public listing and search (name, category, price range, admin)
//! - Admin-only add, update, delete and restock
//! - Atomic single-unit purchase that never drives stock negative
//! - Optional image upload to Cloudinary from `multipart/form-data` bodies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, JSON / multipart forms
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │   Service   │ ──► │ MediaStore  │  ← Image hosting
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, search filter
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_sweets::{MediaConfig, MongoSweetRepository, SweetService, handlers};
//! use axum_helpers::AuthGate;
//! use core_config::FromEnv;
//!
//! # async fn example(db: mongodb::Database, gate: AuthGate) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MongoSweetRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let media = MediaConfig::from_env()?.into_store();
//! let router = handlers::router(SweetService::new(repository, media), gate);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod form;
pub mod handlers;
pub mod media;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{SweetError, SweetResult};
pub use handlers::{ApiDoc, SweetsState};
pub use media::{
    CloudinaryConfig, CloudinaryStore, DisabledMediaStore, MediaConfig, MediaStore, PendingImage,
};
pub use models::{
    NewSweet, RestockRequest, SearchQuery, SortOrder, Sweet, SweetFilter, SweetUpdate,
};
pub use crate::mongodb::MongoSweetRepository;
pub use repository::{InMemorySweetRepository, SweetRepository};
pub use service::SweetService;
