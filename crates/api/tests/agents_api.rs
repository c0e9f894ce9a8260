//! Integration tests for the placeholder agent routes.

mod common;

use axum::http::StatusCode;
use common::{body_text, get, no_entities, post};
use fineguard_events::MemoryBroker;

const AGENTS: [(&str, &str); 4] = [
    ("/api/billing-agent", "Billing Agent executed"),
    ("/api/sales-agent", "Sales Agent executed"),
    ("/api/audit-agent", "Audit Agent executed"),
    ("/api/compliance-ops-agent", "Compliance Ops Agent executed"),
];

#[tokio::test]
async fn placeholders_answer_get_and_post() {
    for (uri, expected) in AGENTS {
        let app = common::build_test_app(no_entities(), &MemoryBroker::new());
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        assert_eq!(body_text(response).await, expected);

        let response = post(app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "POST {uri}");
        assert_eq!(body_text(response).await, expected);
    }
}

#[tokio::test]
async fn placeholders_touch_no_external_system() {
    let broker = MemoryBroker::new();
    for (uri, _) in AGENTS {
        let app = common::build_test_app(no_entities(), &broker);
        post(app, uri).await;
    }
    assert!(broker.calls().is_empty());
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let app = common::build_test_app(no_entities(), &MemoryBroker::new());
    let response = common::send(app, axum::http::Method::DELETE, "/api/billing-agent").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
