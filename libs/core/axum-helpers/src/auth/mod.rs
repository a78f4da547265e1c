//! Token issuance and request authentication.
//!
//! - [`TokenService`]: signs and verifies HS256 access tokens
//! - [`AuthGate`]: resolves the caller of a request into an [`Identity`]
//! - [`Authenticated`] / [`RequireAdmin`]: extractors that run the gate before the handler
//!
//! ```ignore
//! use axum_helpers::auth::{AuthGate, JwtConfig, RequireAdmin, TokenService};
//! use core_config::FromEnv;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env()?);
//! let gate = AuthGate::new(tokens.clone(), Arc::new(user_service.clone()));
//!
//! async fn delete_sweet(RequireAdmin(admin): RequireAdmin, UuidPath(id): UuidPath) { /* ... */ }
//! ```

pub mod config;
pub mod gate;
pub mod token;

pub use config::JwtConfig;
pub use gate::{ADMIN_ROLE, AuthGate, Authenticated, Identity, IdentityProvider, RequireAdmin};
pub use token::{ACCESS_TOKEN_COOKIE, AccessClaims, TokenError, TokenService};
