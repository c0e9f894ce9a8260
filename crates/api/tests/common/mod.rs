#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use fineguard_core::error::CoreError;
use fineguard_events::{EntitySource, MemoryBroker};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fineguard_api::config::ServerConfig;
use fineguard_api::router::build_app_router;
use fineguard_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given entity source and in-memory broker.
pub fn build_test_app(entities: Arc<dyn EntitySource>, broker: &MemoryBroker) -> Router {
    build_test_app_with_config(test_config(), entities, broker)
}

pub fn build_test_app_with_config(
    config: ServerConfig,
    entities: Arc<dyn EntitySource>,
    broker: &MemoryBroker,
) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
        broker: Arc::new(broker.clone()),
        entities,
    };
    build_app_router(state, &config).unwrap()
}

/// Entity source returning a fixed document list, or a fixed failure.
pub struct FixedEntities(pub Result<Vec<serde_json::Value>, &'static str>);

#[async_trait]
impl EntitySource for FixedEntities {
    async fn watched_entities(&self) -> Result<Vec<serde_json::Value>, CoreError> {
        self.0
            .clone()
            .map_err(|msg| CoreError::Connectivity(msg.to_string()))
    }
}

/// Entity source that answers only after `delay`.
pub struct SlowEntities {
    pub delay: Duration,
    pub documents: Vec<serde_json::Value>,
}

#[async_trait]
impl EntitySource for SlowEntities {
    async fn watched_entities(&self) -> Result<Vec<serde_json::Value>, CoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.documents.clone())
    }
}

pub fn entities(documents: Vec<serde_json::Value>) -> Arc<dyn EntitySource> {
    Arc::new(FixedEntities(Ok(documents)))
}

pub fn failing_entities(msg: &'static str) -> Arc<dyn EntitySource> {
    Arc::new(FixedEntities(Err(msg)))
}

pub fn no_entities() -> Arc<dyn EntitySource> {
    entities(Vec::new())
}

pub async fn send(app: Router, method: Method, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
