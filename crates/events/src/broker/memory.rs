//! In-process broker.
//!
//! [`MemoryBroker`] follows the AMQP semantics the core relies on: durable
//! queue declaration is idempotent, publishing to an undeclared queue on the
//! default exchange drops the message, fetching from an undeclared queue is
//! refused, and messages fetched but not acknowledged return to the head of
//! their queue when the session closes.
//!
//! Every session call is appended to a log ([`MemoryBroker::calls`]) so tests
//! can assert on ordering, and [`FailPoint`]s make individual steps fail.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fineguard_core::error::CoreError;

use super::{BrokerConnector, BrokerSession, FetchedMessage};

/// One recorded broker interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCall {
    Connect,
    Declare(String),
    Publish { queue: String, body: Vec<u8> },
    Fetch(String),
    Ack(u64),
    Close,
}

/// A step that should fail until [`MemoryBroker::clear_failures`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Connect,
    /// Fail every publish once `after` publishes have succeeded.
    Publish {
        after: usize,
    },
    Fetch,
    Ack,
    Close,
}

#[derive(Debug, Default)]
struct State {
    queues: HashMap<String, VecDeque<Vec<u8>>>,
    in_flight: HashMap<u64, (String, Vec<u8>)>,
    next_tag: u64,
    calls: Vec<BrokerCall>,
    failures: Vec<FailPoint>,
    published: usize,
    open_sessions: usize,
}

impl State {
    fn failing(&self, point: FailPoint) -> bool {
        self.failures.iter().any(|f| match (f, point) {
            (FailPoint::Publish { after }, FailPoint::Publish { .. }) => self.published >= *after,
            (f, p) => *f == p,
        })
    }
}

/// Shared in-memory broker. Clones share the same queues and call log.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<State>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `point` fail from now on.
    pub fn inject_failure(&self, point: FailPoint) {
        self.lock().failures.push(point);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Declare `queue` without going through a session. Not recorded in the
    /// call log.
    pub fn declare(&self, queue: &str) {
        self.lock().queues.entry(queue.to_string()).or_default();
    }

    /// Place a raw message on `queue`, declaring it if needed. Not recorded
    /// in the call log.
    pub fn enqueue(&self, queue: &str, body: impl Into<Vec<u8>>) {
        self.lock()
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(body.into());
    }

    pub fn queue_exists(&self, queue: &str) -> bool {
        self.lock().queues.contains_key(queue)
    }

    /// Number of queues declared so far.
    pub fn queue_count(&self) -> usize {
        self.lock().queues.len()
    }

    /// Messages ready for delivery on `queue`.
    pub fn depth(&self, queue: &str) -> usize {
        self.lock().queues.get(queue).map_or(0, VecDeque::len)
    }

    /// Snapshot of every recorded call, oldest first.
    pub fn calls(&self) -> Vec<BrokerCall> {
        self.lock().calls.clone()
    }

    /// Bodies of every publish sent to `queue`, in order.
    pub fn published_to(&self, queue: &str) -> Vec<Vec<u8>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BrokerCall::Publish { queue: q, body } if q == queue => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn ack_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, BrokerCall::Ack(_)))
            .count()
    }

    /// Sessions connected but not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.lock().open_sessions
    }
}

#[async_trait]
impl BrokerConnector for MemoryBroker {
    async fn connect(&self) -> Result<Box<dyn BrokerSession>, CoreError> {
        let mut state = self.lock();
        state.calls.push(BrokerCall::Connect);
        if state.failing(FailPoint::Connect) {
            return Err(CoreError::Connectivity("connection refused".into()));
        }
        state.open_sessions += 1;
        drop(state);

        Ok(Box::new(MemorySession {
            broker: self.clone(),
            unacked: Vec::new(),
        }))
    }
}

/// Session handed out by [`MemoryBroker`].
struct MemorySession {
    broker: MemoryBroker,
    unacked: Vec<u64>,
}

#[async_trait]
impl BrokerSession for MemorySession {
    async fn declare_durable_queue(&mut self, queue: &str) -> Result<(), CoreError> {
        let mut state = self.broker.lock();
        state.calls.push(BrokerCall::Declare(queue.to_string()));
        state.queues.entry(queue.to_string()).or_default();
        Ok(())
    }

    async fn publish(&mut self, queue: &str, body: &[u8]) -> Result<(), CoreError> {
        let mut state = self.broker.lock();
        state.calls.push(BrokerCall::Publish {
            queue: queue.to_string(),
            body: body.to_vec(),
        });
        if state.failing(FailPoint::Publish { after: 0 }) {
            return Err(CoreError::Connectivity("connection reset during publish".into()));
        }
        state.published += 1;
        if let Some(messages) = state.queues.get_mut(queue) {
            messages.push_back(body.to_vec());
        }
        Ok(())
    }

    async fn fetch(&mut self, queue: &str) -> Result<Option<FetchedMessage>, CoreError> {
        let mut state = self.broker.lock();
        state.calls.push(BrokerCall::Fetch(queue.to_string()));
        if state.failing(FailPoint::Fetch) {
            return Err(CoreError::Connectivity("channel closed during fetch".into()));
        }

        let Some(messages) = state.queues.get_mut(queue) else {
            return Err(CoreError::Protocol(format!(
                "basic get rejected by broker: NOT_FOUND - no queue '{queue}'"
            )));
        };
        let Some(body) = messages.pop_front() else {
            return Ok(None);
        };

        state.next_tag += 1;
        let delivery_tag = state.next_tag;
        state
            .in_flight
            .insert(delivery_tag, (queue.to_string(), body.clone()));
        self.unacked.push(delivery_tag);

        Ok(Some(FetchedMessage { delivery_tag, body }))
    }

    async fn ack(&mut self, delivery_tag: u64) -> Result<(), CoreError> {
        let mut state = self.broker.lock();
        state.calls.push(BrokerCall::Ack(delivery_tag));
        if state.failing(FailPoint::Ack) {
            return Err(CoreError::Connectivity("connection reset during ack".into()));
        }
        if !self.unacked.contains(&delivery_tag) {
            return Err(CoreError::Protocol(format!(
                "unknown delivery tag {delivery_tag}"
            )));
        }
        self.unacked.retain(|tag| *tag != delivery_tag);
        state.in_flight.remove(&delivery_tag);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        let mut state = self.broker.lock();
        state.calls.push(BrokerCall::Close);
        state.open_sessions = state.open_sessions.saturating_sub(1);

        // Redeliver in original order: the oldest unacked ends up first.
        for tag in self.unacked.iter().rev() {
            if let Some((queue, body)) = state.in_flight.remove(tag) {
                state.queues.entry(queue).or_default().push_front(body);
            }
        }

        if state.failing(FailPoint::Close) {
            return Err(CoreError::Connectivity("connection reset during close".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
