//! Token Service
//!
//! Session tokens are HS256 JWTs carrying the user ID, issue time, expiry and
//! a unique `jti`. Expiry is checked against the injected [`Clock`] with no
//! leeway. Revocation is tracked by `jti` until the token would have expired
//! anyway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::domain::UserId;
use crate::shared::clock::Clock;
use crate::shared::error::ServiceError;

/// Issues and checks session tokens.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Issue a fresh token bound to `user_id`.
    async fn issue(&self, user_id: UserId) -> Result<IssuedToken, ServiceError>;

    /// Resolve a token to its user ID.
    ///
    /// Fails with `TokenExpired` past expiry and `TokenInvalid` for anything
    /// malformed, forged or revoked.
    async fn validate(&self, token: &str) -> Result<UserId, ServiceError>;

    /// Revoke a token so later validation fails.
    async fn revoke(&self, token: &str) -> Result<(), ServiceError>;
}

/// A freshly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds of validity from issuance.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// JWT ID for token revocation tracking
    pub jti: String,
}

/// JWT-backed [`TokenIssuer`].
pub struct JwtTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    /// Revoked `jti` -> original `exp`, pruned once `exp` has passed.
    revoked: DashMap<String, i64>,
}

impl JwtTokenIssuer {
    /// Create a new JwtTokenIssuer
    pub fn new(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `clock` in `decode_claims`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            ttl: Duration::minutes(settings.access_token_ttl_minutes),
            clock,
            revoked: DashMap::new(),
        }
    }

    /// Decode and verify signature; does not look at expiry or revocation.
    fn decode_claims(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ServiceError::TokenInvalid)
    }

    fn is_expired(&self, claims: &Claims) -> bool {
        claims.exp <= self.clock.now().timestamp()
    }

    fn prune_revoked(&self) {
        let now = self.clock.now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn issue(&self, user_id: UserId) -> Result<IssuedToken, ServiceError> {
        let now = self.clock.now();
        // JWT timestamps have second precision.
        let issued_at = Utc
            .timestamp_opt(now.timestamp(), 0)
            .single()
            .unwrap_or(now);
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            issued_at,
            expires_at,
        })
    }

    async fn validate(&self, token: &str) -> Result<UserId, ServiceError> {
        let claims = self.decode_claims(token)?;

        if self.is_expired(&claims) {
            return Err(ServiceError::TokenExpired);
        }

        if self.revoked.contains_key(&claims.jti) {
            return Err(ServiceError::TokenInvalid);
        }

        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ServiceError::TokenInvalid)
    }

    async fn revoke(&self, token: &str) -> Result<(), ServiceError> {
        let claims = self.decode_claims(token)?;

        // An expired token is already unusable.
        if self.is_expired(&claims) {
            return Ok(());
        }

        self.prune_revoked();
        self.revoked.insert(claims.jti, claims.exp);
        Ok(())
    }
}
