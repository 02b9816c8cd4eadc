//! Domain ports for the hexagonal boundary.
//!
//! Storage ports are driven by the coordinator; the snapshot publisher is
//! implemented by the WebSocket connection registry.

mod macros;
pub(crate) use macros::define_port_error;

mod message_repository;
mod product_repository;
mod snapshot_publisher;

#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{
    FixtureMessageRepository, MessageRepository, MessageRepositoryError,
};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{
    FixtureProductRepository, ProductRepository, ProductRepositoryError,
};
#[cfg(test)]
pub use snapshot_publisher::MockSnapshotPublisher;
pub use snapshot_publisher::SnapshotPublisher;
