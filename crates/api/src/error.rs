use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fineguard_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Every error reaching the boundary becomes a `500` with a plain-text
/// `Error: {message}` body. Nothing is retried here; the invoker decides
/// whether to trigger again.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fineguard_core`.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Core(err) = &self;
        tracing::error!(error = %err, retryable = err.is_retryable(), "Failed");

        (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {err}")).into_response()
    }
}
