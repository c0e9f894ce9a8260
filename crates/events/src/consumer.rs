//! Drains the event queue one message per invocation.
//!
//! Per call: connect, fetch (non-blocking), then either report an empty
//! queue or parse, validate, acknowledge, and only after the ack has
//! succeeded, close. Any failure still closes the connection; a message
//! that failed parsing or validation is never acknowledged and goes back to
//! the queue when the connection closes.

use std::sync::Arc;

use fineguard_core::error::CoreError;
use fineguard_core::event::NormalizedEvent;

use crate::broker::{release, BrokerConnector, BrokerSession};

/// Result of one [`MessageConsumer::poll_once`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// One message was processed and acknowledged.
    Processed(NormalizedEvent),
    /// The queue had nothing to deliver.
    EmptyQueue,
}

/// Fetches and acknowledges at most one message per call.
#[derive(Clone)]
pub struct MessageConsumer {
    connector: Arc<dyn BrokerConnector>,
}

impl MessageConsumer {
    pub fn new(connector: Arc<dyn BrokerConnector>) -> Self {
        Self { connector }
    }

    /// Drain at most one message from `queue`.
    pub async fn poll_once(&self, queue: &str) -> Result<PollOutcome, CoreError> {
        let mut session = self.connector.connect().await?;
        let result = Self::fetch_and_process(session.as_mut(), queue).await;
        let result = release(session, result).await;

        match &result {
            Ok(PollOutcome::EmptyQueue) => tracing::info!(queue, "No messages in queue"),
            Ok(PollOutcome::Processed(event)) => tracing::debug!(
                queue,
                company_number = %event.company_number,
                "Message acknowledged",
            ),
            Err(e) => tracing::error!(queue, error = %e, "Queue poll failed"),
        }
        result
    }

    async fn fetch_and_process(
        session: &mut dyn BrokerSession,
        queue: &str,
    ) -> Result<PollOutcome, CoreError> {
        let Some(message) = session.fetch(queue).await? else {
            return Ok(PollOutcome::EmptyQueue);
        };

        let event = NormalizedEvent::from_json(&message.body).inspect_err(|e| {
            tracing::warn!(
                queue,
                delivery_tag = message.delivery_tag,
                error = %e,
                "Rejecting malformed message without acknowledgement",
            );
        })?;

        tracing::info!(
            event_type = %event.event_type,
            company_number = %event.company_number,
            known_type = event.known_type().is_some(),
            timestamp = event.timestamp.as_deref().unwrap_or("-"),
            "Processing event",
        );

        session.ack(message.delivery_tag).await?;
        Ok(PollOutcome::Processed(event))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use fineguard_core::names::EVENTS_NORMALISED_QUEUE;

    use super::*;
    use crate::broker::{BrokerCall, FailPoint, MemoryBroker};

    const E2E_BODY: &str = r#"{"companyNumber":"E2E001","eventType":"accounts-filed","timestamp":"2024-01-15T10:30:00"}"#;

    fn consumer(broker: &MemoryBroker) -> MessageConsumer {
        MessageConsumer::new(Arc::new(broker.clone()))
    }

    /// Declared, empty queue.
    fn broker_with_queue() -> MemoryBroker {
        let broker = MemoryBroker::new();
        broker.declare(EVENTS_NORMALISED_QUEUE);
        broker
    }

    #[tokio::test]
    async fn empty_queue_is_success_with_no_ack() {
        let broker = broker_with_queue();

        let outcome = consumer(&broker)
            .poll_once(EVENTS_NORMALISED_QUEUE)
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::EmptyQueue);
        assert_eq!(broker.ack_count(), 0);
        assert_eq!(broker.open_sessions(), 0);
    }

    #[tokio::test]
    async fn valid_message_is_acked_exactly_once_before_close() {
        let broker = MemoryBroker::new();
        broker.enqueue(EVENTS_NORMALISED_QUEUE, E2E_BODY);

        let outcome = consumer(&broker)
            .poll_once(EVENTS_NORMALISED_QUEUE)
            .await
            .unwrap();

        let event = assert_matches!(outcome, PollOutcome::Processed(event) => event);
        assert_eq!(event.company_number, "E2E001");
        assert_eq!(broker.ack_count(), 1);
        assert_eq!(broker.depth(EVENTS_NORMALISED_QUEUE), 0);

        let calls = broker.calls();
        let ack_at = calls
            .iter()
            .position(|c| matches!(c, BrokerCall::Ack(_)))
            .unwrap();
        let close_at = calls.iter().position(|c| *c == BrokerCall::Close).unwrap();
        assert!(ack_at < close_at, "ack must precede close: {calls:?}");
    }

    #[tokio::test]
    async fn drains_one_message_per_call() {
        let broker = MemoryBroker::new();
        broker.enqueue(EVENTS_NORMALISED_QUEUE, E2E_BODY);
        broker.enqueue(EVENTS_NORMALISED_QUEUE, E2E_BODY);

        let consumer = consumer(&broker);
        consumer.poll_once(EVENTS_NORMALISED_QUEUE).await.unwrap();
        assert_eq!(broker.depth(EVENTS_NORMALISED_QUEUE), 1);

        consumer.poll_once(EVENTS_NORMALISED_QUEUE).await.unwrap();
        assert_eq!(
            consumer.poll_once(EVENTS_NORMALISED_QUEUE).await.unwrap(),
            PollOutcome::EmptyQueue
        );
    }

    #[tokio::test]
    async fn invalid_json_is_never_acked_and_is_redelivered() {
        let broker = MemoryBroker::new();
        broker.enqueue(EVENTS_NORMALISED_QUEUE, "invalid json data");

        let result = consumer(&broker).poll_once(EVENTS_NORMALISED_QUEUE).await;

        assert_matches!(result, Err(CoreError::Protocol(_)));
        assert_eq!(broker.ack_count(), 0);
        assert_eq!(broker.depth(EVENTS_NORMALISED_QUEUE), 1);
        assert_eq!(broker.calls().last(), Some(&BrokerCall::Close));
    }

    #[tokio::test]
    async fn missing_company_number_is_never_acked() {
        let broker = MemoryBroker::new();
        broker.enqueue(
            EVENTS_NORMALISED_QUEUE,
            r#"{"eventType":"accounts-filed","timestamp":"2024-01-15T10:30:00"}"#,
        );

        let result = consumer(&broker).poll_once(EVENTS_NORMALISED_QUEUE).await;

        assert_matches!(result, Err(CoreError::Protocol(_)));
        assert_eq!(broker.ack_count(), 0);
    }

    #[tokio::test]
    async fn unknown_event_type_is_still_processed() {
        let broker = MemoryBroker::new();
        broker.enqueue(
            EVENTS_NORMALISED_QUEUE,
            r#"{"companyNumber":"XYZ789","eventType":"officer-change","timestamp":"2024-01-15T10:30:00"}"#,
        );

        let outcome = consumer(&broker)
            .poll_once(EVENTS_NORMALISED_QUEUE)
            .await
            .unwrap();
        assert_matches!(outcome, PollOutcome::Processed(ref e) if e.company_number == "XYZ789");
    }

    #[tokio::test]
    async fn message_without_timestamp_is_processed_and_acked() {
        let broker = MemoryBroker::new();
        broker.enqueue(
            EVENTS_NORMALISED_QUEUE,
            r#"{"companyNumber":"X1","eventType":"accounts-filed"}"#,
        );
        broker.enqueue(EVENTS_NORMALISED_QUEUE, E2E_BODY);

        let consumer = consumer(&broker);
        let first = consumer.poll_once(EVENTS_NORMALISED_QUEUE).await.unwrap();
        let second = consumer.poll_once(EVENTS_NORMALISED_QUEUE).await.unwrap();

        assert_matches!(first, PollOutcome::Processed(ref e) if e.company_number == "X1" && e.timestamp.is_none());
        assert_matches!(second, PollOutcome::Processed(ref e) if e.company_number == "E2E001");
        assert_eq!(broker.ack_count(), 2);
        assert_eq!(broker.depth(EVENTS_NORMALISED_QUEUE), 0);
    }

    #[tokio::test]
    async fn non_iso_timestamp_does_not_block_the_queue() {
        let broker = MemoryBroker::new();
        broker.enqueue(
            EVENTS_NORMALISED_QUEUE,
            r#"{"companyNumber":"X2","eventType":"accounts-filed","timestamp":"15/01/2024"}"#,
        );

        let outcome = consumer(&broker)
            .poll_once(EVENTS_NORMALISED_QUEUE)
            .await
            .unwrap();

        assert_matches!(outcome, PollOutcome::Processed(ref e) if e.company_number == "X2");
        assert_eq!(broker.ack_count(), 1);
    }

    #[tokio::test]
    async fn undeclared_queue_is_an_error_and_closes() {
        let broker = MemoryBroker::new();

        let result = consumer(&broker).poll_once(EVENTS_NORMALISED_QUEUE).await;

        assert_matches!(result, Err(CoreError::Protocol(_)));
        assert_eq!(broker.open_sessions(), 0);
    }

    #[tokio::test]
    async fn failed_ack_reports_error_and_message_returns() {
        let broker = MemoryBroker::new();
        broker.enqueue(EVENTS_NORMALISED_QUEUE, E2E_BODY);
        broker.inject_failure(FailPoint::Ack);

        let result = consumer(&broker).poll_once(EVENTS_NORMALISED_QUEUE).await;

        assert_matches!(result, Err(CoreError::Connectivity(_)));
        assert_eq!(broker.depth(EVENTS_NORMALISED_QUEUE), 1);
        assert_eq!(broker.open_sessions(), 0);
    }

    #[tokio::test]
    async fn connect_failure_is_retryable() {
        let broker = broker_with_queue();
        broker.inject_failure(FailPoint::Connect);

        let err = consumer(&broker)
            .poll_once(EVENTS_NORMALISED_QUEUE)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
