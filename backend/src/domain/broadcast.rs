//! Write-then-broadcast coordination.
//!
//! Every accepted write follows the same three steps: persist through the
//! storage port, re-read the whole collection, publish the fresh snapshot to
//! every session. Clients therefore only ever see complete collections that
//! came from a `list_all` read, never an individual delta.
//!
//! A failure at any step aborts the cycle before publishing. Other sessions
//! keep their previous, consistent view; the caller reports the error to the
//! originating session only.
//!
//! Each `list_all` read takes a sequence number from a shared counter just
//! before it starts. A read with a higher number began after every write that
//! had completed when a lower-numbered read began, so delivery layers keep
//! only the highest-numbered snapshot per collection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{
    MessageRepository, MessageRepositoryError, ProductRepository, ProductRepositoryError,
    SnapshotPublisher,
};
use crate::domain::{
    DomainError, NewMessage, NormalizationError, NormalizedMessageSet, ProductRecord,
    normalize_messages,
};

/// Timestamp format for the server-assigned `fyh` field.
pub const FYH_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Position of a `list_all` read in the coordinator's read order.
pub type SnapshotSeq = u64;

/// The two broadcast collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Messages,
}

/// A collection snapshot tagged with the sequence number of its read.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<T> {
    pub seq: SnapshotSeq,
    pub snapshot: T,
}

/// Render the server-assigned `fyh` stamp in server local time.
pub fn format_fyh(now: DateTime<Local>) -> String {
    now.format(FYH_FORMAT).to_string()
}

/// Failures that abort a write-then-broadcast cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The product store rejected a read or write.
    #[error(transparent)]
    Products(#[from] ProductRepositoryError),
    /// The message store rejected a read or write.
    #[error(transparent)]
    Messages(#[from] MessageRepositoryError),
    /// Stored messages could not be normalised.
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl From<SyncError> for DomainError {
    fn from(value: SyncError) -> Self {
        match value {
            SyncError::Products(error) => error.into(),
            SyncError::Messages(error) => error.into(),
            SyncError::Normalization(error) => {
                DomainError::serialization_failure(error.to_string())
            }
        }
    }
}

/// The two collection stores, injected together.
#[derive(Clone)]
pub struct CollectionStores {
    pub products: Arc<dyn ProductRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

/// Coordinates persistence and snapshot broadcasting for both collections.
#[derive(Clone)]
pub struct BroadcastCoordinator {
    products: Arc<dyn ProductRepository>,
    messages: Arc<dyn MessageRepository>,
    publisher: Arc<dyn SnapshotPublisher>,
    clock: Arc<dyn Clock>,
    read_seq: Arc<AtomicU64>,
}

impl BroadcastCoordinator {
    /// Wire the coordinator to its stores, publisher, and clock.
    pub fn new(
        stores: CollectionStores,
        publisher: Arc<dyn SnapshotPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let CollectionStores { products, messages } = stores;
        Self {
            products,
            messages,
            publisher,
            clock,
            read_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_read_seq(&self) -> SnapshotSeq {
        self.read_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current catalogue, for a session's initial snapshot.
    pub async fn product_snapshot(&self) -> Result<Sequenced<Vec<ProductRecord>>, SyncError> {
        let seq = self.next_read_seq();
        let snapshot = self.products.list_all().await?;
        Ok(Sequenced { seq, snapshot })
    }

    /// Current normalised message log, for a session's initial snapshot.
    pub async fn message_snapshot(&self) -> Result<Sequenced<NormalizedMessageSet>, SyncError> {
        let seq = self.next_read_seq();
        let messages = self.messages.list_all().await?;
        Ok(Sequenced {
            seq,
            snapshot: normalize_messages(&messages)?,
        })
    }

    /// Persist a product, then broadcast the whole catalogue.
    ///
    /// Returns the number of sessions the snapshot was queued for.
    pub async fn handle_product_update(&self, product: ProductRecord) -> Result<usize, SyncError> {
        let product_id = product.id();
        let saved = self.products.save(product).await.inspect_err(|error| {
            warn!(product_id, error = %error, "product save failed; skipping broadcast");
        })?;
        debug!(product_id = saved.id(), "product saved");

        let catalogue = self.product_snapshot().await.inspect_err(|error| {
            warn!(product_id, error = %error, "catalogue re-read failed; skipping broadcast");
        })?;
        let sessions = self
            .publisher
            .publish_products(catalogue.seq, &catalogue.snapshot);
        debug!(
            product_id,
            seq = catalogue.seq,
            products = catalogue.snapshot.len(),
            sessions,
            "catalogue snapshot broadcast"
        );
        Ok(sessions)
    }

    /// Stamp a message with the server's local time, persist it, then broadcast the
    /// normalised log.
    ///
    /// Returns the number of sessions the snapshot was queued for.
    pub async fn handle_new_message(&self, draft: NewMessage) -> Result<usize, SyncError> {
        let fyh = format_fyh(self.clock.local());
        let saved = self
            .messages
            .save(draft.stamp(fyh))
            .await
            .inspect_err(|error| {
                warn!(error = %error, "message save failed; skipping broadcast");
            })?;
        let message_id = saved.id().to_string();
        debug!(message_id = %message_id, fyh = saved.fyh(), "message saved");

        let snapshot = self.message_snapshot().await.inspect_err(|error| {
            warn!(
                message_id = %message_id,
                error = %error,
                "message snapshot failed; skipping broadcast"
            );
        })?;
        let sessions = self
            .publisher
            .publish_messages(snapshot.seq, &snapshot.snapshot);
        debug!(
            message_id = %message_id,
            seq = snapshot.seq,
            messages = snapshot.snapshot.message_ids().len(),
            sessions,
            "message snapshot broadcast"
        );
        Ok(sessions)
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
