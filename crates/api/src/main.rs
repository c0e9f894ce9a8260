use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use fineguard_core::error::CoreError;
use fineguard_db::{StoreClient, StoreConfig};
use fineguard_events::{AmqpConnector, BrokerConfig, StoreEntitySource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fineguard_api::config::ServerConfig;
use fineguard_api::router::build_app_router;
use fineguard_api::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fineguard_api=debug,fineguard_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CoreError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let broker_config = BrokerConfig::from_env()?;
    let store_config = StoreConfig::from_env()?;
    tracing::info!(
        broker_connect_timeout_secs = broker_config.connect_timeout.as_secs(),
        store_max_connections = store_config.max_connections,
        "Loaded broker and store configuration",
    );

    // --- Store (connected on first use) ---
    let store = Arc::new(StoreClient::new(store_config));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        broker: Arc::new(AmqpConnector::new(broker_config)),
        entities: Arc::new(StoreEntitySource::new(store)),
    };

    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host: IpAddr = config.host.parse().map_err(|e| {
        CoreError::Configuration(format!("HOST must be an IP address, got '{}': {e}", config.host))
    })?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CoreError::Connectivity(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CoreError::Internal(format!("Server error: {e}")))?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
