//! Authentication Service
//!
//! Handles registration, login, logout and resolution of bearer tokens to
//! callers. Sessions are independent: logging in again never invalidates
//! earlier tokens.

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::services::password_service::PasswordService;
use crate::application::services::token_service::{IssuedToken, TokenIssuer};
use crate::domain::{CredentialStore, PresenceStore, User, UserId};
use crate::shared::clock::Clock;
use crate::shared::error::{ServiceError, StoreError, UniqueField};
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{normalize_email, validation_error};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and open a session for them
    async fn register(&self, request: RegisterRequest) -> Result<AuthSession, ServiceError>;

    /// Authenticate with username or email plus password
    async fn login(&self, request: LoginRequest) -> Result<AuthSession, ServiceError>;

    /// Revoke the presented token
    async fn logout(&self, token: &str) -> Result<(), ServiceError>;

    /// Resolve a token to the ID of a user that still exists
    async fn authenticate(&self, token: &str) -> Result<UserId, ServiceError>;
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: IssuedToken,
}

/// AuthService implementation
pub struct AuthServiceImpl<U, T>
where
    U: CredentialStore + PresenceStore,
    T: TokenIssuer,
{
    user_store: Arc<U>,
    tokens: Arc<T>,
    passwords: Arc<PasswordService>,
    id_generator: Arc<SnowflakeGenerator>,
    clock: Arc<dyn Clock>,
}

impl<U, T> AuthServiceImpl<U, T>
where
    U: CredentialStore + PresenceStore,
    T: TokenIssuer,
{
    /// Create a new AuthServiceImpl
    pub fn new(
        user_store: Arc<U>,
        tokens: Arc<T>,
        passwords: Arc<PasswordService>,
        id_generator: Arc<SnowflakeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_store,
            tokens,
            passwords,
            id_generator,
            clock,
        }
    }

    /// `@` marks an email; anything else is an exact username.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, ServiceError> {
        let user = if identifier.contains('@') {
            self.user_store
                .find_by_email(&normalize_email(identifier))
                .await?
        } else {
            self.user_store.find_by_username(identifier).await?
        };
        Ok(user)
    }
}

#[async_trait]
impl<U, T> AuthService for AuthServiceImpl<U, T>
where
    U: CredentialStore + PresenceStore + 'static,
    T: TokenIssuer + 'static,
{
    async fn register(&self, mut request: RegisterRequest) -> Result<AuthSession, ServiceError> {
        request.email = normalize_email(&request.email);
        request.validate().map_err(validation_error)?;

        // Check if username already exists
        if self
            .user_store
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(UniqueField::Username));
        }

        // Check if email already exists
        if self
            .user_store
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadyExists(UniqueField::Email));
        }

        let password_hash = self.passwords.hash(&request.password).await?;

        let user = User::new_registered(
            self.id_generator.generate(),
            request.username,
            request.email,
            request.avatar_url,
            self.clock.now(),
        );

        // The store re-checks uniqueness; a concurrent registration that got
        // there first surfaces here as Duplicate.
        let created = self
            .user_store
            .create(&user, &password_hash)
            .await
            .map_err(|e| {
                if let StoreError::Duplicate(field) = &e {
                    tracing::debug!(%field, "Registration lost a uniqueness race");
                }
                ServiceError::from(e)
            })?;

        let token = self.tokens.issue(created.id).await?;

        tracing::info!(user_id = created.id, username = %created.username, "User registered");

        Ok(AuthSession {
            user: created,
            token,
        })
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthSession, ServiceError> {
        request.validate().map_err(validation_error)?;

        let user = self.find_by_identifier(&request.identifier).await?;
        let password_hash = match &user {
            Some(user) => self.user_store.password_hash(user.id).await?,
            None => None,
        };

        // Runs even for unknown users so both failures cost the same.
        let verified = self
            .passwords
            .verify(&request.password, password_hash.as_deref())
            .await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!("Failed login attempt");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let user = self
            .user_store
            .touch_last_seen(user.id, self.clock.now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::InvalidCredentials,
                other => other.into(),
            })?;

        let token = self.tokens.issue(user.id).await?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(AuthSession { user, token })
    }

    async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        self.tokens.revoke(token).await
    }

    async fn authenticate(&self, token: &str) -> Result<UserId, ServiceError> {
        let user_id = self.tokens.validate(token).await?;

        match self.user_store.find_by_id(user_id).await? {
            Some(_) => Ok(user_id),
            None => Err(ServiceError::TokenInvalid),
        }
    }
}
