//! Registry of live WebSocket sessions.
//!
//! Each session owns an unbounded outbound queue; the registry keeps the
//! sending half keyed by a per-session id. Broadcasting enqueues the same
//! serialised frame on every queue and never waits on a slow client. Queues
//! whose receiver has gone away are pruned during the broadcast that finds
//! them.
//!
//! The registry also records, per session and collection, the sequence number
//! of the newest snapshot it queued. An older snapshot is never queued after a
//! newer one, so a session's last frame for a collection is always the
//! freshest read.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::ports::SnapshotPublisher;
use crate::domain::{Collection, NormalizedMessageSet, ProductRecord, SnapshotSeq};
use crate::inbound::ws::messages::ServerEvent;

/// Identifier assigned to a session when it registers.
pub type ConnectionId = Uuid;

/// Receiving half of a session's outbound queue.
pub type Outbound = mpsc::UnboundedReceiver<String>;

/// Outcome of queuing a snapshot for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame was queued.
    Queued,
    /// The session already holds a newer snapshot of this collection.
    Superseded,
    /// The session is unknown or its queue has closed.
    Gone,
}

#[derive(Debug)]
struct SessionSlot {
    tx: mpsc::UnboundedSender<String>,
    products_seq: SnapshotSeq,
    messages_seq: SnapshotSeq,
}

impl SessionSlot {
    fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            tx,
            products_seq: 0,
            messages_seq: 0,
        }
    }

    fn delivered(&mut self, collection: Collection) -> &mut SnapshotSeq {
        match collection {
            Collection::Products => &mut self.products_seq,
            Collection::Messages => &mut self.messages_seq,
        }
    }

    /// Queue `frame` unless a snapshot at `seq` or later was already queued.
    fn offer(&mut self, collection: Collection, seq: SnapshotSeq, frame: String) -> Delivery {
        if *self.delivered(collection) >= seq {
            return if self.tx.is_closed() {
                Delivery::Gone
            } else {
                Delivery::Superseded
            };
        }
        if self.tx.send(frame).is_err() {
            return Delivery::Gone;
        }
        *self.delivered(collection) = seq;
        Delivery::Queued
    }
}

type Sessions = HashMap<ConnectionId, SessionSlot>;

/// Set of live sessions and their outbound queues.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    sessions: Mutex<Sessions>,
}

impl ConnectionManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // The map holds no invariants a panicking holder could break, so a
    // poisoned lock is still usable.
    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a session and return its id and outbound queue.
    pub fn register(&self) -> (ConnectionId, Outbound) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let live = {
            let mut sessions = self.sessions();
            sessions.insert(id, SessionSlot::new(tx));
            sessions.len()
        };
        debug!(connection_id = %id, live, "session registered");
        (id, rx)
    }

    /// Remove a session. Unknown ids are ignored.
    pub fn deregister(&self, id: ConnectionId) {
        let removed = self.sessions().remove(&id).is_some();
        if removed {
            debug!(connection_id = %id, "session deregistered");
        }
    }

    /// Queue an unsequenced frame, such as an error acknowledgement, for one
    /// session. Returns `false` when the session is unknown or already closed.
    pub fn send_to(&self, id: ConnectionId, frame: String) -> bool {
        let mut sessions = self.sessions();
        let Some(slot) = sessions.get(&id) else {
            return false;
        };
        if slot.tx.send(frame).is_ok() {
            return true;
        }
        sessions.remove(&id);
        false
    }

    /// Queue a snapshot read at `seq` for one session.
    pub fn send_snapshot(
        &self,
        id: ConnectionId,
        collection: Collection,
        seq: SnapshotSeq,
        frame: String,
    ) -> Delivery {
        let mut sessions = self.sessions();
        let Some(slot) = sessions.get_mut(&id) else {
            return Delivery::Gone;
        };
        let delivery = slot.offer(collection, seq, frame);
        if delivery == Delivery::Gone {
            sessions.remove(&id);
        }
        delivery
    }

    /// Queue a snapshot read at `seq` for every live session that does not
    /// already hold a newer one, and return how many sessions queued it.
    pub fn broadcast_snapshot(
        &self,
        collection: Collection,
        seq: SnapshotSeq,
        frame: &str,
    ) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        let mut queued = 0;
        sessions.retain(|_, slot| match slot.offer(collection, seq, frame.to_owned()) {
            Delivery::Queued => {
                queued += 1;
                true
            }
            Delivery::Superseded => true,
            Delivery::Gone => false,
        });
        let live = sessions.len();
        if live < before {
            debug!(pruned = before - live, "pruned closed sessions");
        }
        if queued < live {
            debug!(
                ?collection,
                seq,
                skipped = live - queued,
                "sessions already hold a newer snapshot"
            );
        }
        queued
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Whether no session is registered.
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    fn publish(&self, collection: Collection, seq: SnapshotSeq, event: &ServerEvent<'_>) -> usize {
        match serde_json::to_string(event) {
            Ok(frame) => self.broadcast_snapshot(collection, seq, &frame),
            Err(err) => {
                error!(event = event.name(), error = %err, "failed to serialise snapshot");
                0
            }
        }
    }
}

impl SnapshotPublisher for ConnectionManager {
    fn publish_products(&self, seq: SnapshotSeq, products: &[ProductRecord]) -> usize {
        self.publish(Collection::Products, seq, &ServerEvent::Products(products))
    }

    fn publish_messages(&self, seq: SnapshotSeq, messages: &NormalizedMessageSet) -> usize {
        self.publish(Collection::Messages, seq, &ServerEvent::Messages(messages))
    }
}
