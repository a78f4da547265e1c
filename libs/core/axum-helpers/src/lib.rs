//! # Axum Helpers
//!
//! Shared building blocks for the sweetshop HTTP services.
//!
//! ## Modules
//!
//! - **[`auth`]**: access tokens, the authorization gate and identity extractors
//! - **[`errors`]**: [`AppError`] and the error envelope
//! - **[`response`]**: the success envelope
//! - **[`extractors`]**: UUID path and validated JSON extractors
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly, health probes, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! create_production_app(router, &server_config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod response;
pub mod server;

pub use auth::{
    ADMIN_ROLE, ACCESS_TOKEN_COOKIE, AuthGate, Authenticated, Identity, IdentityProvider,
    JwtConfig, RequireAdmin, TokenError, TokenService,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use response::ApiResponse;

pub use extractors::{UuidPath, ValidatedJson};
