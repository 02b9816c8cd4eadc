//! Driven port for pushing snapshots to every connected client.
//!
//! The coordinator publishes complete collections, never deltas. Delivery is
//! fire-and-forget: implementations enqueue the payload for each live session
//! and report how many sessions it reached. `seq` orders snapshots of one
//! collection; a session never receives a snapshot older than one it holds.

use crate::domain::{NormalizedMessageSet, ProductRecord, SnapshotSeq};

/// Broadcast sink for collection snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotPublisher: Send + Sync {
    /// Send the full catalogue to every session, the writer included.
    fn publish_products(&self, seq: SnapshotSeq, products: &[ProductRecord]) -> usize;

    /// Send the normalised message log to every session, the writer included.
    fn publish_messages(&self, seq: SnapshotSeq, messages: &NormalizedMessageSet) -> usize;
}

