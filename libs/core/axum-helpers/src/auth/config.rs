//! Access token configuration.

use core_config::{ConfigError, Environment, FromEnv, env_or_default, env_required_any};
use std::time::Duration;

/// Minimum accepted signing secret length.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_EXPIRY: &str = "1d";

/// Access token configuration.
///
/// Loaded from environment variables:
/// - `ACCESS_TOKEN_SECRET` or `JWT_SECRET` (required, at least 32 characters)
/// - `ACCESS_TOKEN_EXPIRY` (default `1d`): `45s`, `30m`, `12h`, `1d`, `2w` or bare seconds
/// - `APP_ENV`: the `accessToken` cookie is marked `Secure` in production
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
    pub secure_cookie: bool,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        validate_secret(&secret)?;
        Ok(Self {
            secret,
            ttl,
            secure_cookie: false,
        })
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "ACCESS_TOKEN_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

/// Parses `45s`, `30m`, `12h`, `1d`, `2w` or a bare number of seconds.
pub fn parse_expiry(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("'{}' does not start with a number", raw))?;

    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        other => return Err(format!("unknown duration unit '{}'", other)),
    };

    if amount == 0 {
        return Err("expiry must be greater than zero".to_string());
    }

    Ok(Duration::from_secs(amount * multiplier))
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required_any(&["ACCESS_TOKEN_SECRET", "JWT_SECRET"])?;
        validate_secret(&secret)?;

        let ttl = parse_expiry(&env_or_default("ACCESS_TOKEN_EXPIRY", DEFAULT_EXPIRY)).map_err(
            |details| ConfigError::ParseError {
                key: "ACCESS_TOKEN_EXPIRY".to_string(),
                details,
            },
        )?;

        Ok(Self {
            secret,
            ttl,
            secure_cookie: Environment::from_env().use_https(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_parse_expiry_units() {
        assert_eq!(parse_expiry("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_expiry("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_expiry("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_expiry("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_expiry("2w").unwrap(), Duration::from_secs(1_209_600));
        assert_eq!(parse_expiry("900").unwrap(), Duration::from_secs(900));
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        assert!(parse_expiry("d").is_err());
        assert!(parse_expiry("1y").is_err());
        assert!(parse_expiry("0h").is_err());
    }

    #[test]
    fn test_new_rejects_short_secret() {
        assert!(JwtConfig::new("short", Duration::from_secs(60)).is_err());
        assert!(JwtConfig::new(SECRET, Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("ACCESS_TOKEN_SECRET", Some(SECRET)),
                ("ACCESS_TOKEN_EXPIRY", None),
                ("APP_ENV", None),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.ttl, Duration::from_secs(86_400));
                assert!(!config.secure_cookie);
            },
        );
    }

    #[test]
    fn test_from_env_falls_back_to_jwt_secret() {
        temp_env::with_vars(
            [
                ("ACCESS_TOKEN_SECRET", None),
                ("JWT_SECRET", Some(SECRET)),
                ("ACCESS_TOKEN_EXPIRY", Some("15m")),
                ("APP_ENV", Some("production")),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.ttl, Duration::from_secs(900));
                assert!(config.secure_cookie);
            },
        );
    }

    #[test]
    fn test_from_env_missing_secret() {
        temp_env::with_vars(
            [("ACCESS_TOKEN_SECRET", None::<&str>), ("JWT_SECRET", None)],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("ACCESS_TOKEN_SECRET"));
            },
        );
    }

    #[test]
    fn test_from_env_bad_expiry() {
        temp_env::with_vars(
            [
                ("ACCESS_TOKEN_SECRET", Some(SECRET)),
                ("ACCESS_TOKEN_EXPIRY", Some("forever")),
            ],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("ACCESS_TOKEN_EXPIRY"));
            },
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::new(SECRET, Duration::from_secs(60)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }
}
