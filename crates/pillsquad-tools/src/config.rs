//! Tool-layer configuration
//!
//! Layered: optional YAML file, then `PILLSQUAD_TOOLS__*` environment
//! variables, then command-line flags.

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `PILLSQUAD_TOOLS__API__BASE_URL=http://api:8000`
pub const ENV_PREFIX: &str = "PILLSQUAD_TOOLS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Certified-product CSV
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Remote prediction API
    #[serde(default)]
    pub api: ApiEndpoints,

    #[serde(default)]
    pub browser: BrowserConfig,

    /// Directory downloaded images are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub download_mode: DownloadMode,

    /// Timeout for plain page fetches and image downloads
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

/// Location of the remote prediction API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEndpoints {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the company-origin endpoint
    #[serde(default = "default_company_endpoint")]
    pub company_endpoint: String,

    #[serde(default = "default_ingredient_endpoint")]
    pub ingredient_endpoint: String,

    #[serde(default = "default_image_endpoint")]
    pub image_endpoint: String,

    #[serde(default = "default_company_timeout")]
    pub company_timeout_secs: u64,

    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
}

/// WebDriver session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Upper bound on waiting for `document.readyState == "complete"`
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
}

/// How `download_image` obtains the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Fetch the image bytes over HTTP and store them verbatim
    #[default]
    Direct,
    /// Open the URL in the browser and store a full-window PNG screenshot
    Screenshot,
}

impl ToolsConfig {
    /// Load all layers, command-line flags last
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_sources(&cli.config)?;

        if let Some(csv) = &cli.csv {
            config.csv_path = csv.clone();
        }
        if let Some(url) = &cli.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(url) = &cli.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if let Some(dir) = &cli.output_dir {
            config.output_dir = dir.clone();
        }

        Ok(config)
    }

    /// File (if present) and environment layers
    pub fn from_sources(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            api: ApiEndpoints::default(),
            browser: BrowserConfig::default(),
            output_dir: default_output_dir(),
            download_mode: DownloadMode::default(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            company_endpoint: default_company_endpoint(),
            ingredient_endpoint: default_ingredient_endpoint(),
            image_endpoint: default_image_endpoint(),
            company_timeout_secs: default_company_timeout(),
            image_timeout_secs: default_image_timeout(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            page_load_timeout_secs: default_page_load_timeout(),
            ready_timeout_secs: default_ready_timeout(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("./data.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("image")
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_company_endpoint() -> String {
    "/predict-company".to_string()
}

fn default_ingredient_endpoint() -> String {
    "/predict".to_string()
}

fn default_image_endpoint() -> String {
    "/classify-image".to_string()
}

fn default_company_timeout() -> u64 {
    10
}

fn default_image_timeout() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_page_load_timeout() -> u64 {
    30
}

fn default_ready_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
