//! Application state management.
//!
//! The state holds the two domain services and the authorization gate that
//! both route trees share. It is generic over the repositories so the same
//! wiring runs against MongoDB in production and in-memory stores in tests.

use axum_helpers::AuthGate;
use domain_sweets::{MongoSweetRepository, SweetRepository, SweetService};
use domain_users::{CredentialStore, MongoUserRepository, UserRepository, UserService};
use mongodb::Database;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state (cheap to clone, every field is Arc-backed)
pub struct AppState<U: UserRepository, S: SweetRepository> {
    pub users: UserService<U>,
    pub sweets: SweetService<S>,
    pub gate: AuthGate,
}

impl<U: UserRepository + 'static, S: SweetRepository> AppState<U, S> {
    /// The gate verifies tokens with the registry's key and resolves
    /// identities through the registry itself.
    pub fn new(users: UserService<U>, sweets: SweetService<S>) -> Self {
        let gate = AuthGate::new(users.tokens().clone(), Arc::new(users.clone()));
        Self {
            users,
            sweets,
            gate,
        }
    }
}

impl<U: UserRepository, S: SweetRepository> Clone for AppState<U, S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            sweets: self.sweets.clone(),
            gate: self.gate.clone(),
        }
    }
}

/// Production state backed by MongoDB
pub type MongoState = AppState<MongoUserRepository, MongoSweetRepository>;

impl MongoState {
    /// Build the MongoDB repositories and ensure their indexes exist.
    pub async fn connect(db: &Database, config: &Config) -> eyre::Result<Self> {
        let user_repository = MongoUserRepository::new(db);
        user_repository.init_indexes().await?;

        let sweet_repository = MongoSweetRepository::new(db);
        sweet_repository.init_indexes().await?;

        let tokens = axum_helpers::TokenService::new(&config.jwt);
        let users = UserService::new(user_repository, CredentialStore::new(), tokens)
            .with_role_policy(config.role_policy);
        let sweets = SweetService::new(sweet_repository, config.media.clone().into_store());

        Ok(Self::new(users, sweets))
    }
}
