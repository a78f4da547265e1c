//! Users Domain
//!
//! Accounts, credentials and the `/auth` endpoints.
//!
//! # Features
//!
//! - Registration and login returning a signed access token
//! - Argon2id password hashing on the blocking pool
//! - Email uniqueness enforced by the store (unique index / write lock)
//! - Identity lookup for the authorization gate ([`axum_helpers::IdentityProvider`])
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Registration, login, role policy
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{CredentialStore, MongoUserRepository, UserService, handlers};
//! use axum_helpers::{JwtConfig, TokenService};
//! use core_config::FromEnv;
//!
//! # async fn example(db: mongodb::Database) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MongoUserRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env()?);
//! let service = UserService::new(repository, CredentialStore::new(), tokens);
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{AuthPayload, LoginRequest, RegisterRequest, Role, User, UserResponse};
pub use crate::mongodb::MongoUserRepository;
pub use password::CredentialStore;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{RolePolicy, UserService};
