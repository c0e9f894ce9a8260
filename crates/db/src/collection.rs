//! Named collection view over the `documents` table.

use fineguard_core::error::CoreError;
use fineguard_core::types::DbId;

use crate::models::document::Document;
use crate::repositories::DocumentRepo;
use crate::{store_error, DbPool};

/// Handle to one named collection.
///
/// Cheap to create and clone; holds a clone of the shared pool.
#[derive(Debug, Clone)]
pub struct Collection {
    pool: DbPool,
    name: String,
}

impl Collection {
    pub(crate) fn new(pool: DbPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documents whose body contains every key/value pair of `filter`, in
    /// the order the store returns them.
    ///
    /// `filter` must be a JSON object, e.g. `{"isWatched": true}`.
    pub async fn find(&self, filter: &serde_json::Value) -> Result<Vec<Document>, CoreError> {
        if !filter.is_object() {
            return Err(CoreError::Protocol(format!(
                "collection filter must be a JSON object, got {filter}"
            )));
        }
        let documents = DocumentRepo::find(&self.pool, &self.name, filter)
            .await
            .map_err(store_error)?;
        tracing::debug!(collection = %self.name, matched = documents.len(), "Collection query");
        Ok(documents)
    }

    /// Insert a document body (must be a JSON object).
    pub async fn insert(&self, body: &serde_json::Value) -> Result<DbId, CoreError> {
        if !body.is_object() {
            return Err(CoreError::Protocol(
                "document body must be a JSON object".into(),
            ));
        }
        DocumentRepo::insert(&self.pool, &self.name, body)
            .await
            .map_err(store_error)
    }
}
