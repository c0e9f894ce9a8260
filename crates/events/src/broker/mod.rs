//! Broker seam.
//!
//! [`BrokerConnector`] opens one [`BrokerSession`] per operation; the session
//! is owned by that operation alone and is closed before the operation
//! returns, on success and on error alike (see [`release`]). Connections are
//! never pooled or shared across invocations.
//!
//! Two implementations ship with the crate:
//!
//! - [`amqp::AmqpConnector`]: AMQP 0-9-1 via `lapin`, used in production.
//! - [`memory::MemoryBroker`]: in-process broker that records every call,
//!   used by tests and local runs without a broker.

use async_trait::async_trait;
use fineguard_core::error::CoreError;

pub mod amqp;
pub mod memory;

pub use amqp::{AmqpConnector, BrokerConfig};
pub use memory::{BrokerCall, FailPoint, MemoryBroker};

/// A message taken off a queue by a non-blocking fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    /// Broker-assigned tag; only valid on the session that fetched it.
    pub delivery_tag: u64,
    pub body: Vec<u8>,
}

/// Opens broker sessions.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    /// Open a fresh connection and channel.
    async fn connect(&self) -> Result<Box<dyn BrokerSession>, CoreError>;
}

/// One open broker connection with a single channel.
#[async_trait]
pub trait BrokerSession: Send {
    /// Declare `queue` durable. Redeclaring with the same properties is a
    /// no-op.
    async fn declare_durable_queue(&mut self, queue: &str) -> Result<(), CoreError>;

    /// Publish `body` to the default exchange with `queue` as routing key.
    ///
    /// Returns once the broker has accepted the frame; there is no
    /// publisher-confirm round-trip.
    async fn publish(&mut self, queue: &str, body: &[u8]) -> Result<(), CoreError>;

    /// Fetch at most one message without subscribing.
    async fn fetch(&mut self, queue: &str) -> Result<Option<FetchedMessage>, CoreError>;

    /// Acknowledge a message fetched on this session.
    async fn ack(&mut self, delivery_tag: u64) -> Result<(), CoreError>;

    /// Close the connection. Unacknowledged messages return to their queue.
    async fn close(self: Box<Self>) -> Result<(), CoreError>;
}

/// Close `session` and hand back `result` unchanged.
///
/// Every operation funnels its outcome through here so the connection is
/// released on every exit path. A close failure is logged; it never masks
/// the operation's own result, since by then the work (publish or ack) has
/// either happened or already failed.
pub async fn release<T>(
    session: Box<dyn BrokerSession>,
    result: Result<T, CoreError>,
) -> Result<T, CoreError> {
    if let Err(e) = session.close().await {
        tracing::warn!(
            error = %e,
            operation_failed = result.is_err(),
            "Failed to close broker connection",
        );
    }
    result
}
