//! Sweets API routes

use axum::Router;
use domain_sweets::{SweetRepository, handlers};
use domain_users::UserRepository;

use crate::state::AppState;

pub fn router<U, S>(state: &AppState<U, S>) -> Router
where
    U: UserRepository,
    S: SweetRepository + 'static,
{
    handlers::router(state.sweets.clone(), state.gate.clone())
}
