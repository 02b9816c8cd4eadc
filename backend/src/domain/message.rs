//! Chat message records and their write-side drafts.
//!
//! Messages move through three shapes:
//! - [`NewMessage`]: validated client input, no timestamp.
//! - [`StampedMessage`]: carries the server-assigned `fyh` timestamp and is
//!   what the message store persists.
//! - [`MessageRecord`]: the stored form, always with an identifier.
//!
//! Clients cannot supply `fyh`; only [`NewMessage::stamp`] produces it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::DomainError;

/// Root key under which the whole message collection is addressed in a
/// normalised snapshot. Never valid as a message identifier.
pub const MESSAGES_ROOT_KEY: &str = "mensajes";

/// Validation failures raised while building a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    /// The identifier was empty once trimmed.
    #[error("message id must not be empty")]
    BlankId,
    /// The identifier collides with the snapshot root key.
    #[error("message id '{MESSAGES_ROOT_KEY}' is reserved")]
    ReservedId,
    /// The author email is missing or malformed.
    #[error("author email must be a non-empty address")]
    InvalidEmail,
    /// The message body was empty once trimmed.
    #[error("message text must not be empty")]
    BlankText,
}

impl MessageValidationError {
    /// Wire field name the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankId | Self::ReservedId => "id",
            Self::InvalidEmail => "author.email",
            Self::BlankText => "text",
        }
    }
}

impl From<MessageValidationError> for DomainError {
    fn from(value: MessageValidationError) -> Self {
        DomainError::validation_failure(value.to_string())
            .with_details(json!({ "field": value.field() }))
    }
}

/// Message identifier.
///
/// Deserialisation is transparent so stored data is read back as-is; the
/// normaliser re-checks the reserved root key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Validate a client- or store-supplied identifier.
    ///
    /// # Examples
    /// ```
    /// use showroom::domain::MessageId;
    ///
    /// assert!(MessageId::new("a").is_ok());
    /// assert!(MessageId::new("mensajes").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, MessageValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(MessageValidationError::BlankId);
        }
        if value == MESSAGES_ROOT_KEY {
            return Err(MessageValidationError::ReservedId);
        }
        Ok(Self(value))
    }

    /// Generate a fresh UUID-backed identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message author.
///
/// `email` is the identity; every other field the client sends (name,
/// alias, avatar, ...) is kept verbatim in `profile`. A stored author without
/// an email still deserialises so the normaliser can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    email: String,
    #[serde(flatten)]
    profile: Map<String, Value>,
}

impl Author {
    /// Validate the email and build an author.
    pub fn try_new(
        email: impl Into<String>,
        profile: Map<String, Value>,
    ) -> Result<Self, MessageValidationError> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() || !trimmed.contains('@') {
            return Err(MessageValidationError::InvalidEmail);
        }
        Ok(Self { email, profile })
    }

    /// Author identity.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Additional author fields.
    pub fn profile(&self) -> &Map<String, Value> {
        &self.profile
    }
}

/// Validated client message, not yet timestamped.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    id: Option<MessageId>,
    author: Author,
    text: String,
}

impl NewMessage {
    /// Validate the body and build a draft.
    pub fn try_new(
        id: Option<MessageId>,
        author: Author,
        text: impl Into<String>,
    ) -> Result<Self, MessageValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(MessageValidationError::BlankText);
        }
        Ok(Self { id, author, text })
    }

    /// Attach the server timestamp.
    pub fn stamp(self, fyh: impl Into<String>) -> StampedMessage {
        StampedMessage {
            id: self.id,
            author: self.author,
            text: self.text,
            fyh: fyh.into(),
        }
    }
}

/// A message carrying its server-assigned timestamp, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedMessage {
    id: Option<MessageId>,
    author: Author,
    text: String,
    fyh: String,
}

impl StampedMessage {
    /// Identifier supplied by the client, if any.
    pub fn id(&self) -> Option<&MessageId> {
        self.id.as_ref()
    }

    /// Server timestamp.
    pub fn fyh(&self) -> &str {
        &self.fyh
    }

    /// Convert into the stored form, using `fallback` when no identifier
    /// was supplied.
    pub fn into_record(self, fallback: impl FnOnce() -> MessageId) -> MessageRecord {
        MessageRecord {
            id: self.id.unwrap_or_else(fallback),
            author: self.author,
            text: self.text,
            fyh: self.fyh,
        }
    }
}

/// Stored chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    id: MessageId,
    author: Author,
    text: String,
    fyh: String,
}

impl MessageRecord {
    /// Assemble a stored message from trusted parts.
    pub fn new(
        id: MessageId,
        author: Author,
        text: impl Into<String>,
        fyh: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author,
            text: text.into(),
            fyh: fyh.into(),
        }
    }

    /// Message identifier.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Message author.
    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Server timestamp.
    pub fn fyh(&self) -> &str {
        &self.fyh
    }
}
