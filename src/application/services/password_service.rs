//! Password Service
//!
//! Argon2id hashing and verification. Both operations are CPU- and
//! memory-hard, so they run on tokio's blocking pool instead of a runtime
//! worker thread.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordSettings;
use crate::shared::error::ServiceError;

/// Argon2id password hasher with fixed cost parameters.
pub struct PasswordService {
    params: Params,
    /// Hash of a random secret with the same parameters, verified against when
    /// no user matches so that "unknown user" costs as much as "wrong password".
    dummy_hash: String,
}

impl PasswordService {
    /// Create a new PasswordService
    pub fn new(settings: &PasswordSettings) -> Result<Self, ServiceError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| ServiceError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        let dummy_secret = uuid::Uuid::new_v4().to_string();
        let dummy_hash = hash_with(&params, &dummy_secret)?;

        Ok(Self { params, dummy_hash })
    }

    /// Hash a password using Argon2id
    pub async fn hash(&self, password: &str) -> Result<String, ServiceError> {
        let params = self.params.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hash_with(&params, &password))
            .await
            .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Verify a password against its hash.
    ///
    /// With `hash = None` the password is checked against the dummy hash and
    /// the result is always `false`.
    pub async fn verify(&self, password: &str, hash: Option<&str>) -> Result<bool, ServiceError> {
        let known = hash.is_some();
        let hash = hash.unwrap_or(&self.dummy_hash).to_owned();
        let params = self.params.clone();
        let password = password.to_owned();

        let matched = tokio::task::spawn_blocking(move || verify_with(&params, &password, &hash))
            .await
            .map_err(|e| {
                ServiceError::Internal(format!("Password verification task failed: {}", e))
            })??;

        Ok(known && matched)
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_with(params: &Params, password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ServiceError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(argon2(params)
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
