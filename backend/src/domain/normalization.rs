//! Message normalisation.
//!
//! Flattens an ordered message list into entity tables so clients can look
//! up authors and posts by key instead of walking nested objects:
//!
//! ```text
//! {
//!   "entities": {
//!     "author": { "<email>": { ...author } },
//!     "post":   { "<id>": { "id", "author": "<email>", "text", "fyh" } },
//!     "posts":  { "mensajes": { "id": "mensajes", "mensajes": ["<id>", ...] } }
//!   },
//!   "result": "mensajes"
//! }
//! ```
//!
//! Authors are keyed by email and the last occurrence in input order wins.
//! Entity tables are ordered maps, so equal inputs serialise identically.

use std::collections::BTreeMap;

use serde::Serialize;

use super::message::{Author, MESSAGES_ROOT_KEY, MessageId, MessageRecord};

/// Failures raised when a stored message cannot be normalised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// A message has no usable author email to key the author table.
    #[error("message '{id}' has no author email")]
    MissingAuthorEmail {
        /// Offending message identifier.
        id: String,
    },
    /// A message identifier collides with the snapshot root key.
    #[error("message id '{MESSAGES_ROOT_KEY}' collides with the snapshot root key")]
    ReservedId,
}

/// Post entity: a message whose author has been replaced by its email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostEntity {
    id: MessageId,
    author: String,
    text: String,
    fyh: String,
}

impl PostEntity {
    /// Email of the referenced author entity.
    pub fn author(&self) -> &str {
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

/// Root container listing message ids in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesContainer {
    id: &'static str,
    mensajes: Vec<MessageId>,
}

impl MessagesContainer {
    /// Ordered message identifiers.
    pub fn message_ids(&self) -> &[MessageId] {
        &self.mensajes
    }
}

/// Entity tables of a normalised snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEntities {
    author: BTreeMap<String, Author>,
    post: BTreeMap<MessageId, PostEntity>,
    posts: BTreeMap<&'static str, MessagesContainer>,
}

/// Derived, per-broadcast view of the message log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMessageSet {
    entities: MessageEntities,
    result: &'static str,
}

impl NormalizedMessageSet {
    /// Author table keyed by email.
    pub fn authors(&self) -> &BTreeMap<String, Author> {
        &self.entities.author
    }

    /// Post table keyed by message id.
    pub fn posts(&self) -> &BTreeMap<MessageId, PostEntity> {
        &self.entities.post
    }

    /// Key of the root container; always [`MESSAGES_ROOT_KEY`].
    pub fn result(&self) -> &str {
        self.result
    }

    /// Message ids in input order.
    pub fn message_ids(&self) -> &[MessageId] {
        self.entities
            .posts
            .get(MESSAGES_ROOT_KEY)
            .map_or(&[], MessagesContainer::message_ids)
    }
}

/// Normalise an ordered message list.
///
/// # Errors
/// Returns [`NormalizationError`] when a message lacks an author email or
/// uses the reserved root key as its id. No partial result is produced.
///
/// # Examples
/// ```
/// use serde_json::Map;
/// use showroom::domain::{Author, MessageId, MessageRecord, normalize_messages};
///
/// let author = Author::try_new("e@x.com", Map::new()).expect("valid author");
/// let message = MessageRecord::new(MessageId::new("a").expect("id"), author, "hi", "t1");
/// let set = normalize_messages(&[message]).expect("normalised");
///
/// assert_eq!(set.result(), "mensajes");
/// assert!(set.authors().contains_key("e@x.com"));
/// ```
pub fn normalize_messages(
    messages: &[MessageRecord],
) -> Result<NormalizedMessageSet, NormalizationError> {
    let mut author = BTreeMap::new();
    let mut post = BTreeMap::new();
    let mut ids = Vec::with_capacity(messages.len());

    for message in messages {
        let email = message.author().email();
        if email.trim().is_empty() {
            return Err(NormalizationError::MissingAuthorEmail {
                id: message.id().to_string(),
            });
        }
        if message.id().as_str() == MESSAGES_ROOT_KEY {
            return Err(NormalizationError::ReservedId);
        }

        author.insert(email.to_owned(), message.author().clone());
        post.insert(
            message.id().clone(),
            PostEntity {
                id: message.id().clone(),
                author: email.to_owned(),
                text: message.text().to_owned(),
                fyh: message.fyh().to_owned(),
            },
        );
        ids.push(message.id().clone());
    }

    let container = MessagesContainer {
        id: MESSAGES_ROOT_KEY,
        mensajes: ids,
    };

    Ok(NormalizedMessageSet {
        entities: MessageEntities {
            author,
            post,
            posts: BTreeMap::from([(MESSAGES_ROOT_KEY, container)]),
        },
        result: MESSAGES_ROOT_KEY,
    })
}

#[cfg(test)]
#[path = "normalization_tests.rs"]
mod tests;
