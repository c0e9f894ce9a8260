use std::time::Duration;

/// Error taxonomy shared by every component of the event core.
///
/// An empty queue is not an error; see `PollOutcome::EmptyQueue` in
/// `fineguard-events`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A connection URL (or other setting) is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The broker or the store could not be reached.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// A message body, store document, or broker reply was malformed.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A connect or broker operation did not finish in time.
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether re-triggering the same operation later may succeed.
    ///
    /// The core never retries on its own; this only informs the invoker.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Connectivity(_) | CoreError::Timeout { .. })
    }

    /// Shorthand for a missing required field in a message or document.
    pub fn missing_field(field: &str) -> Self {
        CoreError::Protocol(format!("missing or empty required field `{field}`"))
    }
}
