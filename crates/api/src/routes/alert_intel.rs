//! Alert Intel: consumes at most one event per trigger.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use fineguard_core::names::EVENTS_NORMALISED_QUEUE;
use fineguard_events::{MessageConsumer, PollOutcome};

use crate::error::AppResult;
use crate::state::AppState;
use crate::trigger::run_to_completion;

/// GET|POST /api/alert-intel
pub async fn run(State(state): State<AppState>) -> AppResult<String> {
    tracing::info!("=== Alert Intel Started ===");

    let consumer = MessageConsumer::new(Arc::clone(&state.broker));
    let deadline = Duration::from_secs(state.config.request_timeout_secs);
    let outcome = run_to_completion("alert intel", deadline, async move {
        consumer.poll_once(EVENTS_NORMALISED_QUEUE).await
    })
    .await?;

    let body = match outcome {
        PollOutcome::Processed(event) => {
            format!("Processed event for {}", event.company_number)
        }
        PollOutcome::EmptyQueue => "No messages in queue".to_string(),
    };

    Ok(body)
}
