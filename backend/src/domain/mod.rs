//! Domain primitives and services.
//!
//! Purpose: define the product and message records exchanged with clients,
//! the normalised message view, and the coordinator that turns every accepted
//! write into a full-collection broadcast. Nothing here knows about Actix,
//! Diesel, or the file system; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - [`ProductRecord`] and [`MessageRecord`] with their validating builders.
//! - [`normalize_messages`] producing a [`NormalizedMessageSet`].
//! - [`BroadcastCoordinator`] running write, re-read, publish cycles.
//! - [`DomainError`] / [`ErrorCode`], the transport-agnostic error payload.

pub mod broadcast;
pub mod error;
pub mod message;
pub mod normalization;
pub mod ports;
pub mod product;

pub use self::broadcast::{
    BroadcastCoordinator, Collection, CollectionStores, FYH_FORMAT, Sequenced, SnapshotSeq,
    SyncError, format_fyh,
};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::message::{
    Author, MESSAGES_ROOT_KEY, MessageId, MessageRecord, MessageValidationError, NewMessage,
    StampedMessage,
};
pub use self::normalization::{
    NormalizationError, NormalizedMessageSet, PostEntity, normalize_messages,
};
pub use self::product::{ProductId, ProductRecord, ProductValidationError};
