//! Request authentication and role checks.

use super::token::{ACCESS_TOKEN_COOKIE, TokenService};
use crate::errors::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

const MISSING_TOKEN: &str = "Unauthorized request";
const INVALID_TOKEN: &str = "Invalid Access Token";
const ADMIN_REQUIRED: &str = "Admin privileges required";

/// The authenticated caller of a request. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Identity {
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Looks up the current state of a user referenced by a token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` when the user no longer exists.
    async fn resolve(&self, user_id: Uuid) -> Result<Option<Identity>, AppError>;
}

/// Decides whether a request may proceed.
///
/// Handlers do not use this directly; they take [`Authenticated`] or
/// [`RequireAdmin`], which pull the gate out of router state via `FromRef`.
/// Because extractors run in argument order and body extractors run last,
/// authentication and role checks always complete before the body is read.
#[derive(Clone)]
pub struct AuthGate {
    tokens: TokenService,
    identities: Arc<dyn IdentityProvider>,
}

impl AuthGate {
    pub fn new(tokens: TokenService, identities: Arc<dyn IdentityProvider>) -> Self {
        Self { tokens, identities }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The `accessToken` cookie wins over an `Authorization: Bearer` header.
    pub fn extract_token(headers: &HeaderMap) -> Option<String> {
        let from_cookie = CookieJar::from_headers(headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty());

        from_cookie.or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.token().to_string())
        })
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        let token = Self::extract_token(headers).ok_or_else(|| {
            tracing::debug!("No access token in cookie or Authorization header");
            AppError::Unauthorized(MISSING_TOKEN.to_string())
        })?;

        let user_id = self
            .tokens
            .verify(&token)
            .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;

        match self.identities.resolve(user_id).await? {
            Some(identity) => Ok(identity),
            None => {
                tracing::info!(%user_id, "Token references a user that no longer exists");
                Err(AppError::Unauthorized(INVALID_TOKEN.to_string()))
            }
        }
    }

    pub fn require_role(identity: &Identity, role: &str) -> Result<(), AppError> {
        if identity.has_role(role) {
            Ok(())
        } else {
            tracing::info!(user_id = %identity.id, required = role, actual = %identity.role, "Role check failed");
            Err(AppError::Forbidden(ADMIN_REQUIRED.to_string()))
        }
    }
}

/// Any authenticated user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AuthGate::from_ref(state);
        gate.authenticate(&parts.headers).await.map(Authenticated)
    }
}

/// An authenticated user holding the `admin` role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(identity) = Authenticated::from_request_parts(parts, state).await?;
        AuthGate::require_role(&identity, ADMIN_ROLE)?;
        Ok(RequireAdmin(identity))
    }
}
