use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "pillsquad-dashboard")]
#[command(author, version, about = "PillSquad analysis dashboard")]
pub struct Cli {
    /// Configuration file path (YAML, optional)
    #[arg(short, long, env = "PILLSQUAD_DASHBOARD_CONFIG", default_value = "pillsquad-dashboard.yaml")]
    pub config: PathBuf,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen address
    #[arg(short, long)]
    pub address: Option<String>,

    /// Certified-product CSV
    #[arg(long, env = "PILLSQUAD_CSV")]
    pub csv: Option<PathBuf>,

    /// Prediction API base URL
    #[arg(long, env = "PILLSQUAD_API_URL")]
    pub api_url: Option<String>,

    /// WebDriver server URL
    #[arg(long, env = "PILLSQUAD_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
