//! User Service
//!
//! User lookup and presence. Status changes are self-only and ordered by a
//! server-assigned sequence rather than by arrival order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::identity::RequestIdentity;
use crate::domain::{
    CredentialStore, PresenceStore, PresenceUpdate, UnknownStatus, User, UserId, UserStatus,
};
use crate::shared::clock::Clock;
use crate::shared::error::{ServiceError, StoreError};
use crate::shared::snowflake::SnowflakeGenerator;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, user_id: UserId) -> Result<User, ServiceError>;

    /// Set the caller's own presence status.
    async fn update_status(
        &self,
        caller: &dyn RequestIdentity,
        target: UserId,
        status: &str,
    ) -> Result<StatusAck, ServiceError>;
}

/// Acknowledgement of a status update.
///
/// Carries the state that is actually stored, which differs from the request
/// when a newer update won (`applied == false`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusAck {
    pub user_id: UserId,
    pub status: UserStatus,
    pub last_seen: DateTime<Utc>,
    pub applied: bool,
}

/// UserService implementation
pub struct UserServiceImpl<U>
where
    U: CredentialStore + PresenceStore,
{
    user_store: Arc<U>,
    sequencer: Arc<SnowflakeGenerator>,
    clock: Arc<dyn Clock>,
}

impl<U> UserServiceImpl<U>
where
    U: CredentialStore + PresenceStore,
{
    /// Create a new UserServiceImpl
    pub fn new(user_store: Arc<U>, sequencer: Arc<SnowflakeGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_store,
            sequencer,
            clock,
        }
    }
}

#[async_trait]
impl<U> UserService for UserServiceImpl<U>
where
    U: CredentialStore + PresenceStore + 'static,
{
    async fn get_user(&self, user_id: UserId) -> Result<User, ServiceError> {
        self.user_store
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    async fn update_status(
        &self,
        caller: &dyn RequestIdentity,
        target: UserId,
        status: &str,
    ) -> Result<StatusAck, ServiceError> {
        let caller_id = caller.user_id().ok_or(ServiceError::UserNotFound)?;
        if caller_id != target {
            return Err(ServiceError::Unauthorized);
        }

        let status: UserStatus = status
            .parse()
            .map_err(|e: UnknownStatus| ServiceError::invalid(e.to_string()))?;

        // Sequence is taken before the write so that, of two racing updates,
        // the later-issued one wins regardless of which reaches the store first.
        let update = PresenceUpdate {
            status,
            last_seen: (status == UserStatus::Offline).then(|| self.clock.now()),
            sequence: self.sequencer.generate(),
        };

        let outcome = self
            .user_store
            .apply_presence(target, update)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ServiceError::UserNotFound,
                other => other.into(),
            })?;

        if outcome.applied {
            tracing::debug!(user_id = target, status = %outcome.user.status, "Presence updated");
        } else {
            tracing::debug!(
                user_id = target,
                requested = %status,
                stored = %outcome.user.status,
                "Dropped stale presence update"
            );
        }

        Ok(StatusAck {
            user_id: outcome.user.id,
            status: outcome.user.status,
            last_seen: outcome.user.last_seen,
            applied: outcome.applied,
        })
    }
}
