//! Wire-level event definitions for the WebSocket adapter.
//!
//! Every frame is a JSON text frame shaped `{"event": <name>, "data": <payload>}`.
//! Inbound payloads are untrusted and are converted into domain types through
//! the validating builders before reaching the coordinator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    Author, DomainError, MessageId, NewMessage, NormalizedMessageSet, ProductId, ProductRecord,
};

/// Events accepted from clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Insert or replace a product.
    #[serde(rename = "update")]
    Update(ProductUpdateRequest),
    /// Append a chat message.
    #[serde(rename = "nuevoMensaje")]
    NewMessage(NewMessageRequest),
}

/// Product price as sent by browser forms: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn to_f64(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

/// Payload of the `update` event.
#[derive(Debug, Deserialize)]
pub struct ProductUpdateRequest {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub title: String,
    pub price: PriceInput,
    pub thumbnail: String,
}

impl TryFrom<ProductUpdateRequest> for ProductRecord {
    type Error = DomainError;

    fn try_from(value: ProductUpdateRequest) -> Result<Self, Self::Error> {
        let price = value.price.to_f64();
        Ok(ProductRecord::try_new(
            value.id,
            value.title,
            price,
            value.thumbnail,
        )?)
    }
}

/// Author block of a `nuevoMensaje` payload.
#[derive(Debug, Deserialize)]
pub struct AuthorRequest {
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// Payload of the `nuevoMensaje` event. The server owns `fyh`, so clients
/// may not send one.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMessageRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub author: AuthorRequest,
    pub text: String,
}

impl TryFrom<NewMessageRequest> for NewMessage {
    type Error = DomainError;

    fn try_from(value: NewMessageRequest) -> Result<Self, Self::Error> {
        let id = value.id.map(MessageId::new).transpose()?;
        let author = Author::try_new(value.author.email, value.author.profile)?;
        Ok(NewMessage::try_new(id, author, value.text)?)
    }
}

/// Events pushed to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent<'a> {
    /// Full catalogue snapshot.
    #[serde(rename = "productos")]
    Products(&'a [ProductRecord]),
    /// Normalised message log snapshot.
    #[serde(rename = "mensajes")]
    Messages(&'a NormalizedMessageSet),
    /// Failure acknowledgement for the originating session.
    #[serde(rename = "error")]
    Error(&'a DomainError),
}

impl ServerEvent<'_> {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Products(_) => "productos",
            Self::Messages(_) => "mensajes",
            Self::Error(_) => "error",
        }
    }
}
