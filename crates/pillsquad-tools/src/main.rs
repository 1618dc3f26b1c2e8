//! PillSquad tool server
//!
//! Speaks MCP on stdin/stdout; all logging goes to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use pillsquad_core::CertifiedRegistry;
use pillsquad_tools::{Cli, PillSquadServer, ToolBox, ToolsConfig, WebDriverRenderer};
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting PillSquad tool server");

    let config = ToolsConfig::load(&cli)?;
    info!("Prediction API: {}", config.api.base_url);
    info!("WebDriver: {}", config.browser.webdriver_url);

    let registry = CertifiedRegistry::load(&config.csv_path)
        .with_context(|| format!("loading {}", config.csv_path.display()))?;
    info!("Loaded {} certified products", registry.len());

    let renderer = Arc::new(WebDriverRenderer::new(config.browser.clone()));
    let toolbox = ToolBox::new(&config, Arc::new(registry), renderer)?;
    let server = PillSquadServer::new(Arc::new(toolbox));

    let service = server.serve(rmcp::transport::stdio()).await?;
    info!("MCP session established");
    service.waiting().await?;

    info!("Tool server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("pillsquad=debug,rmcp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pillsquad=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}
