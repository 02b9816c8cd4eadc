//! Storage port for the chat message log.

use async_trait::async_trait;

use crate::domain::{MessageId, MessageRecord, StampedMessage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message store adapters.
    pub enum MessageRepositoryError {
        /// The backing document could not be read or written.
        Io =>
            "message store I/O failed: {message}",
        /// The backing document is not a valid message list.
        Corrupt =>
            "message store document is corrupt: {message}",
    }
}

/// Port for message storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Return every stored message in insertion order. Must not mutate state.
    async fn list_all(&self) -> Result<Vec<MessageRecord>, MessageRepositoryError>;

    /// Upsert a stamped message by id, assigning an id when the message has
    /// none, and return the stored form.
    async fn save(&self, message: StampedMessage) -> Result<MessageRecord, MessageRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageRepository;

#[async_trait]
impl MessageRepository for FixtureMessageRepository {
    async fn list_all(&self) -> Result<Vec<MessageRecord>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn save(&self, message: StampedMessage) -> Result<MessageRecord, MessageRepositoryError> {
        Ok(message.into_record(MessageId::random))
    }
}
