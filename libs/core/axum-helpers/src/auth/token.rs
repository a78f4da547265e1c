use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Cookie carrying the access token for browser clients.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Access token claims. Only the user id is bound into the token;
/// everything else is re-read from the user store per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, malformed token, expired token or a non-UUID subject
    #[error("invalid access token")]
    InvalidToken,

    #[error("failed to sign access token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies stateless HS256 access tokens.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl: Duration,
    secure_cookie: bool,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            ttl: Duration::from_std(config.ttl).unwrap_or_else(|_| Duration::days(1)),
            secure_cookie: config.secure_cookie,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Sign a token for `user_id` expiring after the configured TTL.
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    fn issue_with_ttl(&self, user_id: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys.encoding,
        )?)
    }

    /// Verify signature and expiry and return the bound user id.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<AccessClaims>(
            token,
            &self.keys.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            TokenError::InvalidToken
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::InvalidToken)
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn cookie(&self, token: &str) -> String {
        let secure = if self.secure_cookie { " Secure;" } else { "" };
        format!(
            "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
            ACCESS_TOKEN_COOKIE,
            token,
            secure,
            self.ttl_seconds()
        )
    }
}
