//! PillSquad agent tools
//!
//! Page scraping, image download, certified-product lookup and calls to the
//! remote prediction API, served to an LLM agent as MCP tools and prompts.

pub mod browser;
pub mod cli;
pub mod client;
pub mod config;
pub mod prompts;
pub mod scrape;
pub mod server;
pub mod toolbox;

pub use browser::{PageRenderer, WebDriverRenderer};
pub use cli::Cli;
pub use client::{ApiResponse, PredictionClient};
pub use config::{ApiEndpoints, BrowserConfig, DownloadMode, ToolsConfig};
pub use server::PillSquadServer;
pub use toolbox::ToolBox;
