//! PillSquad Prediction API
//!
//! Serves the ingredient-risk, company-origin and product-image classifiers
//! over HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use pillsquad_api::{create_router, ApiConfig, AppState, Cli};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting PillSquad prediction API");

    let config = ApiConfig::load(&cli)?;
    info!("Configuration loaded successfully");
    info!("Body limit: {} bytes", config.body_limit_bytes);

    let metrics_handle = init_metrics()?;

    // Every configured model is loaded before the listener opens
    let state = AppState::from_config(&config, Some(metrics_handle))?;
    info!("Application state initialized successfully");

    let addr: SocketAddr = config.bind_address().parse()?;
    let app = create_router(state, config.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("pillsquad=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pillsquad=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "pillsquad_requests_total",
        "Total number of prediction requests by endpoint"
    );
    metrics::describe_counter!("pillsquad_errors_total", "Total number of errors by kind");
    metrics::describe_histogram!(
        "pillsquad_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model inference latency in microseconds by model"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
