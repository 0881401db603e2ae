//! # traffic-log demo server
//!
//! Serves a tiny router behind the access-log layer and, once listening,
//! probes itself through a [`CountingTransport`] so both halves of the crate
//! show up in the logs.
//!
//! Configuration is read from the YAML file named by `TRAFFIC_LOG_CONFIG`
//! when set, otherwise defaults plus `TRAFFIC_LOG_*` environment overrides.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use reqwest::{Method, Request, Url};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use traffic_log::client::{CountingTransport, RoundTrip};
use traffic_log::core::config::AppConfig;
use traffic_log::core::error::{TrafficLogError, TrafficLogResult};
use traffic_log::middleware::AccessLogLayer;
use traffic_log::observability::init_logging;

#[tokio::main]
async fn main() -> TrafficLogResult<()> {
    let config = load_config().await?;
    init_logging(&config.logging)?;

    info!("Starting traffic-log demo server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!(error_type = e.error_type(), error = %e, "Demo server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn run(config: AppConfig) -> TrafficLogResult<()> {
    let app = Router::new()
        .route("/", get(|| async { "traffic-log demo\n" }))
        .route("/healthz", get(|| async { "ok\n" }))
        .layer(TraceLayer::new_for_http())
        .layer(AccessLogLayer::new(config.access_log.clone()));

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|e| {
            TrafficLogError::config(format!(
                "Failed to bind {}: {}",
                config.server.bind_address, e
            ))
        })?;
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, "Listening");

    let transport = CountingTransport::from_config(&config.transport)?;
    tokio::spawn(self_probe(transport, local_addr));

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn load_config() -> TrafficLogResult<AppConfig> {
    match std::env::var("TRAFFIC_LOG_CONFIG") {
        Ok(path) => AppConfig::load_from_file(path).await,
        Err(_) => {
            let mut config = AppConfig::default();
            config.apply_env_overrides()?;
            config.validate()?;
            Ok(config)
        }
    }
}

/// Request the health endpoint once through the counting transport
async fn self_probe(transport: CountingTransport, local_addr: SocketAddr) {
    let port = local_addr.port();
    let url = match Url::parse(&format!("http://127.0.0.1:{}/healthz", port)) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Invalid self-probe URL");
            return;
        }
    };

    match transport.round_trip(Request::new(Method::GET, url)).await {
        Ok(response) => info!(
            status = response.status().as_u16(),
            requests = transport.requests(),
            "Self-probe finished"
        ),
        Err(e) => warn!(error = %e, requests = transport.requests(), "Self-probe failed"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
