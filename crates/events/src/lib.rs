//! FineGuard event production and consumption.
//!
//! - [`broker`]: the per-operation broker seam, with AMQP and in-memory
//!   implementations.
//! - [`MessageProducer`]: declares the durable queue and publishes one event.
//! - [`MessageConsumer`]: fetches, validates, and acknowledges one event.
//! - [`EntityWatchScanner`]: emits an event for every watched company.

pub mod broker;
pub mod consumer;
pub mod producer;
pub mod scanner;

pub use broker::{AmqpConnector, BrokerConfig, BrokerConnector, MemoryBroker};
pub use consumer::{MessageConsumer, PollOutcome};
pub use producer::MessageProducer;
pub use scanner::{EntitySource, EntityWatchScanner, StoreEntitySource};
