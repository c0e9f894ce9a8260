//! Document entity model.

use fineguard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `documents` table.
///
/// `body` is the externally owned record; the core never writes to it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub collection: String,
    pub body: serde_json::Value,
    pub created_at: Timestamp,
}
