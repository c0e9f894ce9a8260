use std::sync::Arc;

use fineguard_events::{BrokerConnector, EntitySource};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Opens one broker session per producer/consumer call.
    pub broker: Arc<dyn BrokerConnector>,
    /// Watched-entity documents (the `companies` collection in production).
    pub entities: Arc<dyn EntitySource>,
}
