//! Dashboard configuration
//!
//! Layered: optional YAML file, then `PILLSQUAD_DASHBOARD__*` environment
//! variables, then command-line flags.

use crate::cli::Cli;
use pillsquad_tools::{ApiEndpoints, BrowserConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `PILLSQUAD_DASHBOARD__PORT=8600`
pub const ENV_PREFIX: &str = "PILLSQUAD_DASHBOARD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    #[serde(default)]
    pub api: ApiEndpoints,

    #[serde(default)]
    pub browser: BrowserConfig,

    /// Page analysis only accepts URLs containing this host
    #[serde(default = "default_allowed_host")]
    pub allowed_host: String,

    /// Images offered for analysis per page
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Characters of page text shown
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_upload_limit")]
    pub upload_limit_bytes: usize,

    /// Allow cross-origin requests from anywhere instead of local dev servers
    #[serde(default)]
    pub allow_any_origin: bool,
}

impl DashboardConfig {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_sources(&cli.config)?;

        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(address) = &cli.address {
            config.listen = address.clone();
        }
        if let Some(csv) = &cli.csv {
            config.csv_path = csv.clone();
        }
        if let Some(url) = &cli.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(url) = &cli.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }

        Ok(config)
    }

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

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            csv_path: default_csv_path(),
            api: ApiEndpoints::default(),
            browser: BrowserConfig::default(),
            allowed_host: default_allowed_host(),
            max_images: default_max_images(),
            preview_chars: default_preview_chars(),
            fetch_timeout_secs: default_fetch_timeout(),
            upload_limit_bytes: default_upload_limit(),
            allow_any_origin: false,
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("./data.csv")
}

fn default_allowed_host() -> String {
    "joongna.com".to_string()
}

fn default_max_images() -> usize {
    6
}

fn default_preview_chars() -> usize {
    100
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_upload_limit() -> usize {
    10 * 1024 * 1024
}
