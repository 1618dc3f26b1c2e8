//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "pillsquad-tools")]
#[command(about = "PillSquad agent tool server (MCP over stdio)", long_about = None)]
pub struct Cli {
    /// Configuration file path (YAML, optional)
    #[arg(short, long, env = "PILLSQUAD_TOOLS_CONFIG", default_value = "pillsquad-tools.yaml")]
    pub config: PathBuf,

    /// Certified-product CSV
    #[arg(long, env = "PILLSQUAD_CSV")]
    pub csv: Option<PathBuf>,

    /// Prediction API base URL
    #[arg(long, env = "PILLSQUAD_API_URL")]
    pub api_url: Option<String>,

    /// WebDriver server URL
    #[arg(long, env = "PILLSQUAD_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Directory downloaded images are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
