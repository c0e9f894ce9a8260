pub mod agents;
pub mod alert_intel;
pub mod data_sentinel;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /data-sentinel          GET, POST   scan watched companies, publish events
/// /alert-intel            GET, POST   consume one event
/// /billing-agent          GET, POST   placeholder
/// /sales-agent            GET, POST   placeholder
/// /audit-agent            GET, POST   placeholder
/// /compliance-ops-agent   GET, POST   placeholder
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/data-sentinel",
            get(data_sentinel::run).post(data_sentinel::run),
        )
        .route("/alert-intel", get(alert_intel::run).post(alert_intel::run))
        .route("/billing-agent", get(agents::billing).post(agents::billing))
        .route("/sales-agent", get(agents::sales).post(agents::sales))
        .route("/audit-agent", get(agents::audit).post(agents::audit))
        .route(
            "/compliance-ops-agent",
            get(agents::compliance_ops).post(agents::compliance_ops),
        )
}
