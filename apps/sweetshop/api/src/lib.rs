//! Sweetshop API
//!
//! HTTP service for a sweet shop: account registration and login, a public
//! inventory listing, admin-managed stock and authenticated purchases.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   ↓ (JSON / multipart over HTTP)
//! axum_helpers::create_router  (docs, CORS, security headers, tracing)
//!   ↓
//! /api/auth  → domain_users  (UserService)
//! /api/sweets → domain_sweets (SweetService, gated by AuthGate)
//!   ↓
//! MongoDB
//! ```
//!
//! ## Modules
//!
//! - `api`: route wiring and the readiness probe
//! - `config`: environment configuration
//! - `openapi`: the combined OpenAPI document
//! - `state`: shared services and the authorization gate

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

use axum::Router;
use core_config::AppInfo;

pub use config::Config;
pub use state::{AppState, MongoState};

/// Wrap the `/api` routes with docs, middleware and `/health`.
pub fn app(api_routes: Router, app_info: AppInfo) -> std::io::Result<Router> {
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes)?;
    Ok(router.merge(axum_helpers::health_router(app_info)))
}
