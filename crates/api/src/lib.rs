//! FineGuard HTTP invocation boundary.
//!
//! Each handler is triggered by a plain HTTP request (inputs ignored) and
//! answers with a plain-text body: `200` on success, `500` with
//! `Error: {message}` on failure. Exposes config, state, error handling,
//! and routes so the binary and the integration tests share them.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
pub mod trigger;
