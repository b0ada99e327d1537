//! Chat Service
//!
//! Room-scoped message operations. Every call resolves the caller first,
//! then checks room membership, then validates its input, and only then
//! touches the message store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dto::request::{MessageQueryParams, SendMessageRequest};
use crate::application::identity::RequestIdentity;
use crate::config::MessageSettings;
use crate::domain::{
    CredentialStore, Message, MessageId, MessageStore, MessageType, MessageWindow, NewMessage,
    ReadCursor, RoomId, RoomMembership, RoomRole, User,
};
use crate::shared::clock::Clock;
use crate::shared::error::{ServiceError, StoreError};

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Post a message to a room
    async fn send_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        request: SendMessageRequest,
    ) -> Result<Message, ServiceError>;

    /// Get a single message
    async fn get_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<Message, ServiceError>;

    /// Page through a room's history, oldest first
    async fn list_messages(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        query: MessageQueryParams,
    ) -> Result<Vec<Message>, ServiceError>;

    /// Replace the content of the caller's own message
    async fn edit_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
        content: &str,
    ) -> Result<Message, ServiceError>;

    /// Delete a message (author or room moderator)
    async fn delete_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<(), ServiceError>;

    /// Move the caller's read cursor up to `message_id`
    async fn mark_as_read(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<ReadCursor, ServiceError>;

    /// Messages after the caller's read cursor, oldest first
    async fn get_unread_messages(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, ServiceError>;
}

/// ChatService implementation
pub struct ChatServiceImpl<U, R, M>
where
    U: CredentialStore,
    R: RoomMembership,
    M: MessageStore,
{
    user_store: Arc<U>,
    rooms: Arc<R>,
    message_store: Arc<M>,
    settings: MessageSettings,
    clock: Arc<dyn Clock>,
}

impl<U, R, M> ChatServiceImpl<U, R, M>
where
    U: CredentialStore,
    R: RoomMembership,
    M: MessageStore,
{
    pub fn new(
        user_store: Arc<U>,
        rooms: Arc<R>,
        message_store: Arc<M>,
        settings: MessageSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_store,
            rooms,
            message_store,
            settings,
            clock,
        }
    }

    /// Resolve the caller to a user that still exists.
    async fn resolve_caller(&self, caller: &dyn RequestIdentity) -> Result<User, ServiceError> {
        let user_id = caller.user_id().ok_or(ServiceError::UserNotFound)?;
        self.user_store
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    /// Resolve the caller and require room membership. Returns the caller and
    /// their role.
    async fn authorize(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
    ) -> Result<(User, RoomRole), ServiceError> {
        let user = self.resolve_caller(caller).await?;
        let role = self
            .rooms
            .role(room_id, user.id)
            .await?
            .ok_or(ServiceError::Unauthorized)?;
        Ok((user, role))
    }

    fn validate_content(&self, content: &str) -> Result<(), ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::invalid("Message content cannot be empty"));
        }

        let max = self.settings.max_content_length;
        if content.chars().count() > max {
            return Err(ServiceError::invalid(format!(
                "Message content must be at most {} characters",
                max
            )));
        }

        Ok(())
    }

    fn parse_message_type(&self, raw: Option<&str>) -> Result<MessageType, ServiceError> {
        let Some(raw) = raw else {
            return Ok(MessageType::default());
        };

        let message_type: MessageType = raw.parse().map_err(ServiceError::InvalidArgument)?;
        if message_type.is_system() {
            return Err(ServiceError::invalid(
                "System messages cannot be sent by users",
            ));
        }
        Ok(message_type)
    }

    fn page_limit(&self, limit: Option<u32>) -> Result<u32, ServiceError> {
        match limit {
            None => Ok(self.settings.default_page_size),
            Some(0) => Err(ServiceError::invalid("limit must be at least 1")),
            Some(n) => Ok(n.min(self.settings.max_page_size)),
        }
    }

    /// Fetch a message that must belong to `room_id`.
    async fn message_in_room(
        &self,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<Message, ServiceError> {
        self.message_store
            .find_by_id(message_id)
            .await?
            .filter(|m| m.room_id == room_id)
            .ok_or(ServiceError::MessageNotFound)
    }
}

fn message_gone(e: StoreError) -> ServiceError {
    match e {
        StoreError::NotFound => ServiceError::MessageNotFound,
        other => other.into(),
    }
}

#[async_trait]
impl<U, R, M> ChatService for ChatServiceImpl<U, R, M>
where
    U: CredentialStore + 'static,
    R: RoomMembership + 'static,
    M: MessageStore + 'static,
{
    async fn send_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        request: SendMessageRequest,
    ) -> Result<Message, ServiceError> {
        let (user, _) = self.authorize(caller, room_id).await?;

        self.validate_content(&request.content)?;
        let message_type = self.parse_message_type(request.message_type.as_deref())?;

        let message = self
            .message_store
            .append(NewMessage {
                room_id,
                user_id: user.id,
                username: user.username,
                content: request.content,
                message_type,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::debug!(
            message_id = message.id,
            room_id,
            user_id = message.user_id,
            "Message stored"
        );

        Ok(message)
    }

    async fn get_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<Message, ServiceError> {
        self.authorize(caller, room_id).await?;
        self.message_in_room(room_id, message_id).await
    }

    async fn list_messages(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        query: MessageQueryParams,
    ) -> Result<Vec<Message>, ServiceError> {
        self.authorize(caller, room_id).await?;

        let window = MessageWindow {
            before: query.before,
            after: query.after,
            limit: self.page_limit(query.limit)?,
        };

        Ok(self.message_store.list(room_id, window).await?)
    }

    async fn edit_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
        content: &str,
    ) -> Result<Message, ServiceError> {
        let (user, _) = self.authorize(caller, room_id).await?;
        let message = self.message_in_room(room_id, message_id).await?;

        // Only author can edit
        if message.user_id != user.id {
            return Err(ServiceError::Unauthorized);
        }

        self.validate_content(content)?;

        self.message_store
            .update_content(message_id, content, self.clock.now())
            .await
            .map_err(message_gone)
    }

    async fn delete_message(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<(), ServiceError> {
        let (user, role) = self.authorize(caller, room_id).await?;
        let message = self.message_in_room(room_id, message_id).await?;

        if message.user_id != user.id && !role.can_moderate() {
            return Err(ServiceError::Unauthorized);
        }

        self.message_store
            .delete(message_id)
            .await
            .map_err(message_gone)?;

        tracing::debug!(message_id, room_id, actor_id = user.id, "Message deleted");
        Ok(())
    }

    async fn mark_as_read(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<ReadCursor, ServiceError> {
        let (user, _) = self.authorize(caller, room_id).await?;
        self.message_in_room(room_id, message_id).await?;

        let last_read_message_id = self
            .message_store
            .advance_read_cursor(room_id, user.id, message_id)
            .await?;

        Ok(ReadCursor {
            room_id,
            user_id: user.id,
            last_read_message_id,
        })
    }

    async fn get_unread_messages(
        &self,
        caller: &dyn RequestIdentity,
        room_id: RoomId,
        limit: Option<u32>,
    ) -> Result<Vec<Message>, ServiceError> {
        let (user, _) = self.authorize(caller, room_id).await?;
        let limit = self.page_limit(limit)?;

        let cursor = self.message_store.read_cursor(room_id, user.id).await?;
        // With no cursor the whole history is unread; start from the oldest.
        let window = MessageWindow {
            before: None,
            after: Some(cursor.unwrap_or(0)),
            limit,
        };

        Ok(self.message_store.list(room_id, window).await?)
    }
}
