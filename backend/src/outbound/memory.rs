//! Process-local stores.
//!
//! Used when no database is configured and by adapter tests that need real
//! persistence semantics without I/O. Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{
    MessageRepository, MessageRepositoryError, ProductRepository, ProductRepositoryError,
};
use crate::domain::{MessageId, MessageRecord, ProductId, ProductRecord, StampedMessage};

/// Catalogue held in an id-ordered map.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<ProductId, ProductRecord>>,
}

impl InMemoryProductRepository {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalogue pre-filled with `products`; later duplicates win.
    pub fn with_products(products: impl IntoIterator<Item = ProductRecord>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.id(), product))
            .collect();
        Self {
            products: RwLock::new(products),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, ProductRepositoryError> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn save(&self, product: ProductRecord) -> Result<ProductRecord, ProductRepositoryError> {
        self.products
            .write()
            .await
            .insert(product.id(), product.clone());
        Ok(product)
    }
}

/// Message log held in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<Vec<MessageRecord>>,
}

impl InMemoryMessageRepository {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log pre-filled with `messages`; a repeated id replaces the
    /// earlier record in place.
    pub fn with_messages(messages: impl IntoIterator<Item = MessageRecord>) -> Self {
        let mut log = Vec::new();
        for record in messages {
            upsert_message(&mut log, record);
        }
        Self {
            messages: RwLock::new(log),
        }
    }
}

/// Replace the record with the same id in place, or append it.
pub(crate) fn upsert_message(messages: &mut Vec<MessageRecord>, record: MessageRecord) {
    match messages
        .iter_mut()
        .find(|existing| existing.id() == record.id())
    {
        Some(existing) => *existing = record,
        None => messages.push(record),
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn list_all(&self) -> Result<Vec<MessageRecord>, MessageRepositoryError> {
        Ok(self.messages.read().await.clone())
    }

    async fn save(&self, message: StampedMessage) -> Result<MessageRecord, MessageRepositoryError> {
        let record = message.into_record(MessageId::random);
        upsert_message(&mut *self.messages.write().await, record.clone());
        Ok(record)
    }
}
