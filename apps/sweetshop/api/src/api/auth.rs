//! Auth API routes

use axum::Router;
use domain_sweets::SweetRepository;
use domain_users::{UserRepository, handlers};

use crate::state::AppState;

pub fn router<U, S>(state: &AppState<U, S>) -> Router
where
    U: UserRepository + 'static,
    S: SweetRepository,
{
    handlers::router(state.users.clone())
}
