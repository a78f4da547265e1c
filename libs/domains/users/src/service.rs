use async_trait::async_trait;
use axum_helpers::{AppError, Identity, IdentityProvider, TokenService};
use core_config::{ConfigError, env_flag};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ALL_FIELDS_REQUIRED, UserError, UserResult};
use crate::models::{AuthPayload, LoginRequest, RegisterRequest, Role, User, UserResponse, present};
use crate::password::CredentialStore;
use crate::repository::UserRepository;

/// What to do with a role requested at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolePolicy {
    /// Every self-registered account is a `user`
    #[default]
    UserOnly,
    /// Store the requested role as given
    TrustRequested,
}

impl RolePolicy {
    /// Reads `AUTH_TRUST_REQUESTED_ROLE` (default `false`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(if env_flag("AUTH_TRUST_REQUESTED_ROLE", false)? {
            RolePolicy::TrustRequested
        } else {
            RolePolicy::UserOnly
        })
    }
}

/// Account Registry: registration, login and identity lookup
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    credentials: CredentialStore,
    tokens: TokenService,
    role_policy: RolePolicy,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
            role_policy: self.role_policy,
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, credentials: CredentialStore, tokens: TokenService) -> Self {
        Self {
            repository: Arc::new(repository),
            credentials,
            tokens,
            role_policy: RolePolicy::default(),
        }
    }

    pub fn with_role_policy(mut self, role_policy: RolePolicy) -> Self {
        self.role_policy = role_policy;
        self
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account and sign the new user in.
    #[instrument(skip_all, fields(email = ?input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthPayload> {
        let (Some(name), Some(email), Some(_)) = (
            present(&input.name),
            present(&input.email),
            present(&input.password),
        ) else {
            return Err(UserError::Validation(ALL_FIELDS_REQUIRED.to_string()));
        };
        let password = input.password.as_deref().unwrap_or_default();

        let role = self.resolve_role(input.role.as_deref())?;

        // Hashing happens here, before the record exists
        let password_hash = self.credentials.hash(password).await?;
        let user = User::new(name.to_string(), email.to_string(), password_hash, role);

        let created = self.repository.create(user).await?;
        let token = self.tokens.issue(created.id)?;

        tracing::info!(user_id = %created.id, role = %created.role, "User registered");
        Ok(AuthPayload {
            user: created.into(),
            token,
        })
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip_all, fields(email = ?input.email))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthPayload> {
        let (Some(email), Some(_)) = (present(&input.email), present(&input.password)) else {
            return Err(UserError::Validation(ALL_FIELDS_REQUIRED.to_string()));
        };
        let password = input.password.as_deref().unwrap_or_default();

        let Some(user) = self.repository.get_by_email(email).await? else {
            self.credentials.verify_dummy(password).await?;
            tracing::info!("Login failed");
            return Err(UserError::InvalidCredentials);
        };

        if !self.credentials.verify(password, &user.password_hash).await? {
            tracing::info!("Login failed");
            return Err(UserError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AuthPayload {
            user: user.into(),
            token,
        })
    }

    /// Elevation path for administrative tooling. Not exposed over HTTP.
    #[instrument(skip(self))]
    pub async fn set_role(&self, id: Uuid, role: Role) -> UserResult<UserResponse> {
        let user = self
            .repository
            .set_role(id, role)
            .await?
            .ok_or(UserError::NotFound(id))?;
        Ok(user.into())
    }

    fn resolve_role(&self, requested: Option<&str>) -> UserResult<Role> {
        let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Role::User);
        };

        match self.role_policy {
            RolePolicy::TrustRequested => Role::from_str(requested)
                .map_err(|_| UserError::Validation(format!("Invalid role '{}'", requested))),
            RolePolicy::UserOnly => {
                if requested != Role::User.to_string() {
                    tracing::warn!(requested, "Ignoring requested role at registration");
                }
                Ok(Role::User)
            }
        }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> IdentityProvider for UserService<R> {
    async fn resolve(&self, user_id: Uuid) -> Result<Option<Identity>, AppError> {
        let user = self.repository.get_by_id(user_id).await?;
        Ok(user.as_ref().map(Identity::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use axum_helpers::JwtConfig;
    use std::time::Duration;

    const SECRET: &str = "unit-test-secret-with-at-least-32-chars";

    fn tokens() -> TokenService {
        TokenService::new(&JwtConfig::new(SECRET, Duration::from_secs(3600)).unwrap())
    }

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(
            InMemoryUserRepository::new(),
            CredentialStore::insecure_fast(),
            tokens(),
        )
    }

    fn register_input(email: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: Some("Alice".into()),
            email: Some(email.into()),
            password: Some("hunter2!".into()),
            role: role.map(String::from),
        }
    }

    fn login_input(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn test_register_returns_user_and_valid_token() {
        let service = service();
        let payload = service
            .register(register_input("alice@example.com", None))
            .await
            .unwrap();

        assert_eq!(payload.user.email, "alice@example.com");
        assert_eq!(payload.user.role, Role::User);
        assert_eq!(service.tokens().verify(&payload.token).unwrap(), payload.user.id);
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() {
        let service = service();
        for input in [
            RegisterRequest {
                name: None,
                ..register_input("a@example.com", None)
            },
            RegisterRequest {
                email: Some("   ".into()),
                ..register_input("a@example.com", None)
            },
            RegisterRequest {
                password: None,
                ..register_input("a@example.com", None)
            },
        ] {
            let err = service.register(input).await.unwrap_err();
            assert!(matches!(err, UserError::Validation(ref m) if m == ALL_FIELDS_REQUIRED));
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = service();
        service
            .register(register_input("dup@example.com", None))
            .await
            .unwrap();

        let mut again = register_input("dup@example.com", None);
        again.name = Some("Someone Else".into());
        again.password = Some("different".into());
        let err = service.register(again).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_requested_admin_role_downgraded_by_default() {
        let service = service();
        let payload = service
            .register(register_input("sneaky@example.com", Some("admin")))
            .await
            .unwrap();
        assert_eq!(payload.user.role, Role::User);
    }

    #[tokio::test]
    async fn test_trusted_policy_keeps_requested_role() {
        let service = service().with_role_policy(RolePolicy::TrustRequested);
        let payload = service
            .register(register_input("boss@example.com", Some("admin")))
            .await
            .unwrap();
        assert_eq!(payload.user.role, Role::Admin);

        let err = service
            .register(register_input("odd@example.com", Some("wizard")))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = service();
        let registered = service
            .register(register_input("bob@example.com", None))
            .await
            .unwrap();

        let payload = service
            .login(login_input("bob@example.com", "hunter2!"))
            .await
            .unwrap();
        assert_eq!(payload.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service
            .register(register_input("carol@example.com", None))
            .await
            .unwrap();

        let wrong_password = service
            .login(login_input("carol@example.com", "nope"))
            .await
            .unwrap_err();
        let unknown_email = service
            .login(login_input("nobody@example.com", "hunter2!"))
            .await
            .unwrap_err();

        let a: AppError = wrong_password.into();
        let b: AppError = unknown_email.into();
        assert_eq!(a.status(), b.status());
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn test_set_role_elevates() {
        let service = service();
        let payload = service
            .register(register_input("promote@example.com", None))
            .await
            .unwrap();

        let user = service.set_role(payload.user.id, Role::Admin).await.unwrap();
        assert_eq!(user.role, Role::Admin);

        let identity = service.resolve(payload.user.id).await.unwrap().unwrap();
        assert!(identity.has_role("admin"));
    }

    #[tokio::test]
    async fn test_resolve_missing_user_is_none() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = UserService::new(repo, CredentialStore::insecure_fast(), tokens());
        assert!(service.resolve(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repository_failure_surfaces_as_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(|_| Err(UserError::Database("socket closed".into())));

        let service = UserService::new(repo, CredentialStore::insecure_fast(), tokens());
        let err = service
            .login(login_input("x@example.com", "pw"))
            .await
            .unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_role_policy_from_env() {
        temp_env::with_var("AUTH_TRUST_REQUESTED_ROLE", Some("true"), || {
            assert_eq!(RolePolicy::from_env().unwrap(), RolePolicy::TrustRequested);
        });
        temp_env::with_var_unset("AUTH_TRUST_REQUESTED_ROLE", || {
            assert_eq!(RolePolicy::from_env().unwrap(), RolePolicy::UserOnly);
        });
    }
}
