//! Shared domain types for the FineGuard event core.
//!
//! Everything that both sides of the queue must agree on lives here: the
//! [`NormalizedEvent`](event::NormalizedEvent) wire schema, the enumerated
//! [`EventType`](event::EventType) set, the queue and collection names, and
//! the [`CoreError`](error::CoreError) taxonomy.

pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod names;
pub mod types;
