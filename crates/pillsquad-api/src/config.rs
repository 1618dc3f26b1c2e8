//! API server configuration
//!
//! Layered: optional YAML file, then `PILLSQUAD_API__*` environment
//! variables, then command-line flags.

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `PILLSQUAD_API__PORT=9000`
pub const ENV_PREFIX: &str = "PILLSQUAD_API";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Models YAML; without it every prediction endpoint answers 503
    #[serde(default)]
    pub models_config: Option<PathBuf>,

    /// Upper bound on request bodies, uploads included
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl ApiConfig {
    /// Load configuration from file and environment, then apply CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_sources(&cli.config)?;

        if let Some(models) = &cli.models {
            config.models_config = Some(models.clone());
        }
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(limit) = cli.body_limit {
            config.body_limit_bytes = limit;
        }

        Ok(config)
    }

    /// File (if present) and environment layers only
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
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            models_config: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ApiConfig::from_sources(Path::new("/nonexistent/pillsquad-api.yaml")).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.body_limit_bytes, 10 * 1024 * 1024);
        assert!(config.models_config.is_none());
    }

    #[test]
    fn test_yaml_file_then_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.yaml");
        std::fs::write(
            &path,
            "listen: 127.0.0.1\nport: 9100\nmodels_config: models.yaml\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "pillsquad-api",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "9200",
        ]);
        let config = ApiConfig::load(&cli).unwrap();

        assert_eq!(config.listen, "127.0.0.1");
        assert_eq!(config.port, 9200);
        assert_eq!(config.models_config, Some(PathBuf::from("models.yaml")));
        assert_eq!(config.bind_address(), "127.0.0.1:9200");
    }
}
