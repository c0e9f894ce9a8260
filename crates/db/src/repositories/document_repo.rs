//! Repository for the `documents` table.

use fineguard_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::Document;

/// Column list for `documents` queries.
const DOCUMENT_COLUMNS: &str = "id, collection, body, created_at";

/// Provides read/write operations on stored documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Documents in `collection` whose body contains `filter` (JSONB `@>`),
    /// in insertion order.
    pub async fn find(
        pool: &PgPool,
        collection: &str,
        filter: &serde_json::Value,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents \
             WHERE collection = $1 AND body @> $2 \
             ORDER BY id"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(collection)
            .bind(filter)
            .fetch_all(pool)
            .await
    }

    /// Insert a document, returning its generated ID.
    pub async fn insert(
        pool: &PgPool,
        collection: &str,
        body: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO documents (collection, body) VALUES ($1, $2) RETURNING id")
            .bind(collection)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// Count documents in a collection.
    pub async fn count(pool: &PgPool, collection: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(pool)
            .await
    }
}
