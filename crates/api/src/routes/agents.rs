//! Placeholder agents. Each logs its start line and one line describing
//! the work it stands in for, then reports success.

/// GET|POST /api/billing-agent
pub async fn billing() -> &'static str {
    tracing::info!("=== Billing Agent Started ===");
    tracing::info!("Usage-based billing would happen here");
    "Billing Agent executed"
}

/// GET|POST /api/sales-agent
pub async fn sales() -> &'static str {
    tracing::info!("=== Sales Agent Started ===");
    tracing::info!("High-value lead processing would happen here");
    "Sales Agent executed"
}

/// GET|POST /api/audit-agent
pub async fn audit() -> &'static str {
    tracing::info!("=== Audit Agent Started ===");
    tracing::info!("Immutable audit logging would happen here");
    "Audit Agent executed"
}

/// GET|POST /api/compliance-ops-agent
pub async fn compliance_ops() -> &'static str {
    tracing::info!("=== Compliance Ops Agent Started ===");
    tracing::info!("Compliance task management would happen here");
    "Compliance Ops Agent executed"
}
