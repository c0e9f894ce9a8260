//! Watched-entity scanner.
//!
//! [`EntityWatchScanner::run`] reads every watched company from an
//! [`EntitySource`], turns each into an `accounts-filed`
//! [`NormalizedEvent`](fineguard_core::event::NormalizedEvent), and publishes
//! them one at a time. The first failure stops the run; anything already
//! published stays published.

use std::sync::Arc;

use async_trait::async_trait;
use fineguard_core::entity::WatchedEntity;
use fineguard_core::error::CoreError;
use fineguard_core::event::EventType;
use fineguard_core::names::{COMPANIES_COLLECTION, EVENTS_NORMALISED_QUEUE, FIELD_IS_WATCHED};
use fineguard_db::StoreClient;

use crate::producer::MessageProducer;

// ---------------------------------------------------------------------------
// EntitySource
// ---------------------------------------------------------------------------

/// Supplies raw watched-entity documents, in store order.
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn watched_entities(&self) -> Result<Vec<serde_json::Value>, CoreError>;
}

/// [`EntitySource`] backed by the `companies` collection.
pub struct StoreEntitySource {
    store: Arc<StoreClient>,
}

impl StoreEntitySource {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntitySource for StoreEntitySource {
    async fn watched_entities(&self) -> Result<Vec<serde_json::Value>, CoreError> {
        let filter = serde_json::json!({ FIELD_IS_WATCHED: true });
        let documents = self.store.collection(COMPANIES_COLLECTION).await?.find(&filter).await?;
        Ok(documents.into_iter().map(|d| d.body).collect())
    }
}

// ---------------------------------------------------------------------------
// EntityWatchScanner
// ---------------------------------------------------------------------------

/// Emits one event per watched entity.
pub struct EntityWatchScanner {
    source: Arc<dyn EntitySource>,
    producer: MessageProducer,
    event_type: EventType,
    queue: &'static str,
}

impl EntityWatchScanner {
    pub fn new(source: Arc<dyn EntitySource>, producer: MessageProducer) -> Self {
        Self {
            source,
            producer,
            event_type: EventType::AccountsFiled,
            queue: EVENTS_NORMALISED_QUEUE,
        }
    }

    /// Scan and publish. Returns how many events were published.
    ///
    /// Publishing is strictly sequential. On error the count of events
    /// already published is not reported.
    pub async fn run(&self) -> Result<usize, CoreError> {
        let documents = self.source.watched_entities().await.inspect_err(|e| {
            tracing::error!(error = %e, "Watched entity query failed");
        })?;
        tracing::info!(count = documents.len(), "Found watched companies");

        let mut published = 0;
        for document in &documents {
            let entity = WatchedEntity::from_document(document)?;
            let event = entity.to_event(self.event_type);
            self.producer.publish(self.queue, &event).await?;
            published += 1;
            tracing::info!(company_number = %entity.company_number, "Event sent");
        }

        Ok(published)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
