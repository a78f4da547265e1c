//! API routes module
//!
//! Wires the domain routers together. Everything here is nested under `/api`
//! by `axum_helpers::create_router`.

pub mod auth;
pub mod health;
pub mod sweets;

use axum::Router;
use domain_sweets::SweetRepository;
use domain_users::UserRepository;

use crate::state::AppState;

/// Create the `/auth` and `/sweets` routes
pub fn routes<U, S>(state: &AppState<U, S>) -> Router
where
    U: UserRepository + 'static,
    S: SweetRepository + 'static,
{
    Router::new()
        .nest("/auth", auth::router(state))
        .nest("/sweets", sweets::router(state))
}
