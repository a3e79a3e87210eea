//! Message bus abstraction
//!
//! The worker consumes ordered byte payloads from a consumer group and
//! acknowledges each one manually, after the full pipeline has run for it.
//! This trait is that contract; the bus itself is an external collaborator.

use crate::domain::Result;
use async_trait::async_trait;
use std::time::Duration;

/// One delivered message, carrying enough identity to commit its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    /// Raw message payload
    pub payload: Vec<u8>,

    /// Topic the message arrived on
    pub topic: String,

    /// Partition within the topic
    pub partition: i32,

    /// Offset of this message within the partition
    pub offset: i64,
}

/// A manually-committed consumer-group subscription
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait up to `timeout` for the next message
    ///
    /// Returns `Ok(None)` when the timeout elapses with nothing delivered,
    /// so the caller can check for shutdown between polls.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying consumer reports one; the caller
    /// logs it and keeps polling.
    async fn poll(&self, timeout: Duration) -> Result<Option<DeliveredMessage>>;

    /// Commit the position after `message`, synchronously
    ///
    /// Called only after the message has been fully processed, which is
    /// what gives the worker its at-least-once guarantee.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    async fn commit(&self, message: &DeliveredMessage) -> Result<()>;
}
