//! Data Sentinel: emits an `accounts-filed` event for every watched company.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use fineguard_events::{EntityWatchScanner, MessageProducer};

use crate::error::AppResult;
use crate::state::AppState;
use crate::trigger::run_to_completion;

/// GET|POST /api/data-sentinel
pub async fn run(State(state): State<AppState>) -> AppResult<String> {
    tracing::info!("=== Data Sentinel Started ===");

    let producer = MessageProducer::new(Arc::clone(&state.broker));
    let scanner = EntityWatchScanner::new(Arc::clone(&state.entities), producer);
    let deadline = Duration::from_secs(state.config.request_timeout_secs);
    let count = run_to_completion("data sentinel", deadline, async move { scanner.run().await })
        .await?;

    Ok(format!("Processed {count} companies"))
}
