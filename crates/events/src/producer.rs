//! Publishes normalized events onto a durable queue.

use std::sync::Arc;

use fineguard_core::error::CoreError;
use fineguard_core::event::NormalizedEvent;

use crate::broker::{release, BrokerConnector, BrokerSession};

/// Sends one event per call over a connection scoped to that call.
#[derive(Clone)]
pub struct MessageProducer {
    connector: Arc<dyn BrokerConnector>,
}

impl MessageProducer {
    pub fn new(connector: Arc<dyn BrokerConnector>) -> Self {
        Self { connector }
    }

    /// Declare `queue` durable and publish `event` to it.
    ///
    /// Success means the broker accepted the publish frame, not that the
    /// message was persisted: without publisher confirms a broker failure
    /// right after acceptance can still lose it.
    pub async fn publish(&self, queue: &str, event: &NormalizedEvent) -> Result<(), CoreError> {
        let body = event.to_json()?;

        let mut session = self.connector.connect().await?;
        let result = Self::declare_and_publish(session.as_mut(), queue, &body).await;
        let result = release(session, result).await;

        match &result {
            Ok(()) => tracing::info!(
                queue,
                company_number = %event.company_number,
                event_type = %event.event_type,
                "Event published",
            ),
            Err(e) => tracing::error!(
                queue,
                company_number = %event.company_number,
                error = %e,
                "Event publish failed",
            ),
        }
        result
    }

    async fn declare_and_publish(
        session: &mut dyn BrokerSession,
        queue: &str,
        body: &[u8],
    ) -> Result<(), CoreError> {
        session.declare_durable_queue(queue).await?;
        session.publish(queue, body).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
