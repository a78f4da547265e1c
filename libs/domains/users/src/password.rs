//! Credential Store: Argon2id hashing and verification.
//!
//! Hashing is CPU bound, so both operations run on tokio's blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::{Arc, OnceLock};

use crate::error::{UserError, UserResult};

const DUMMY_PASSWORD: &str = "not-a-real-password";

#[derive(Clone)]
pub struct CredentialStore {
    params: Params,
    /// Verified against when the email is unknown so both login failures cost the same
    dummy_hash: Arc<OnceLock<String>>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Cheap parameters for tests. Never use in production.
    pub fn insecure_fast() -> Self {
        // 8 KiB, one pass, one lane; Params::new only rejects out-of-range values
        let params = Params::new(8, 1, 1, None).unwrap_or_default();
        Self::with_params(params)
    }

    fn hasher(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Salted one-way hash in PHC string format.
    pub async fn hash(&self, plaintext: &str) -> UserResult<String> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(params, &plaintext))
            .await
            .map_err(|e| UserError::Internal(format!("hashing task failed: {}", e)))?
    }

    /// `Ok(false)` for a wrong password. A hash that cannot be parsed is an error.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> UserResult<bool> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &hash))
            .await
            .map_err(|e| UserError::Internal(format!("verification task failed: {}", e)))?
    }

    /// Burns one verification against a fixed hash and always returns `false`.
    pub async fn verify_dummy(&self, plaintext: &str) -> UserResult<()> {
        let params = self.params.clone();
        let dummy = self.dummy_hash.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || {
            let hash = match dummy.get() {
                Some(hash) => hash.clone(),
                None => {
                    let hash = hash_blocking(params, DUMMY_PASSWORD)?;
                    dummy.get_or_init(|| hash).clone()
                }
            };
            verify_blocking(&plaintext, &hash).map(|_| ())
        })
        .await
        .map_err(|e| UserError::Internal(format!("verification task failed: {}", e)))?
    }
}

fn hash_blocking(params: Params, plaintext: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    CredentialStore::hasher(params)
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_blocking(plaintext: &str, hash: &str) -> UserResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
    // Cost parameters come from the PHC string, not from this instance
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}
