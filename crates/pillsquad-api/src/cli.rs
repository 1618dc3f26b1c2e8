//! Command-line interface

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "pillsquad-api")]
#[command(about = "PillSquad prediction API", long_about = None)]
pub struct Cli {
    /// Configuration file path (YAML, optional)
    #[arg(short, long, env = "PILLSQUAD_API_CONFIG", default_value = "pillsquad-api.yaml")]
    pub config: PathBuf,

    /// Models configuration file
    #[arg(short, long, env = "PILLSQUAD_MODELS")]
    pub models: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Maximum request body size in bytes
    #[arg(long)]
    pub body_limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
