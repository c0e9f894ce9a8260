//! Runs handler work to completion regardless of the HTTP request's fate.
//!
//! The work is spawned onto the runtime, so neither the response deadline
//! nor a client disconnect can cancel a scan or poll halfway through. If the
//! deadline passes first the caller gets a timeout error while the task
//! finishes on its own and logs its outcome.

use std::future::Future;
use std::time::Duration;

use fineguard_core::error::CoreError;

/// Spawn `work` and wait up to `deadline` for its result.
pub async fn run_to_completion<T, F>(
    operation: &'static str,
    deadline: Duration,
    work: F,
) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>> + Send + 'static,
    T: Send + 'static,
{
    let mut handle = tokio::spawn(async move {
        let result = work.await;
        if let Err(e) = &result {
            tracing::debug!(operation, error = %e, "Triggered operation failed");
        }
        result
    });

    match tokio::time::timeout(deadline, &mut handle).await {
        Ok(joined) => joined.map_err(|e| CoreError::Internal(format!("{operation} aborted: {e}")))?,
        Err(_) => {
            tracing::warn!(
                operation,
                after_secs = deadline.as_secs(),
                "Response deadline passed; operation continues in the background",
            );
            tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(_)) => tracing::info!(operation, "Background operation completed"),
                    Ok(Err(e)) => tracing::error!(operation, error = %e, "Background operation failed"),
                    Err(e) => tracing::error!(operation, error = %e, "Background operation aborted"),
                }
            });
            Err(CoreError::Timeout {
                operation,
                after: deadline,
            })
        }
    }
}
