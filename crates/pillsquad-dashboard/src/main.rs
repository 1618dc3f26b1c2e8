use anyhow::Context;
use clap::Parser;
use pillsquad_core::CertifiedRegistry;
use pillsquad_dashboard::{run_server, Cli, DashboardConfig, DashboardState};
use pillsquad_tools::WebDriverRenderer;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = DashboardConfig::load(&cli)?;

    let registry = CertifiedRegistry::load(&config.csv_path)
        .with_context(|| format!("loading {}", config.csv_path.display()))?;
    tracing::info!("Loaded {} certified products", registry.len());

    let addr: SocketAddr = config.bind_address().parse()?;

    println!();
    println!("  PillSquad 영양제 분류 통합 서비스");
    println!();
    println!("  Prediction API: {}", config.api.base_url);
    println!("  WebDriver:      {}", config.browser.webdriver_url);
    println!();
    println!("  Open http://{} in your browser", addr);
    println!();

    let renderer = Arc::new(WebDriverRenderer::new(config.browser.clone()));
    let state = DashboardState::new(config, Arc::new(registry), renderer)?;

    run_server(state, addr).await
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "pillsquad=debug,tower_http=debug"
    } else {
        "pillsquad=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
