use crate::config::DashboardConfig;
use pillsquad_core::{CertifiedRegistry, Error, Result};
use pillsquad_tools::{PageRenderer, PredictionClient};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct DashboardState {
    pub config: Arc<DashboardConfig>,

    /// Certified-product registry, loaded once
    pub registry: Arc<CertifiedRegistry>,

    /// Remote prediction API
    pub client: PredictionClient,

    /// Browser used for page analysis
    pub renderer: Arc<dyn PageRenderer>,

    /// Plain HTTP client for image fetches
    pub http: reqwest::Client,
}

impl DashboardState {
    pub fn new(
        config: DashboardConfig,
        registry: Arc<CertifiedRegistry>,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: PredictionClient::new(config.api.clone()),
            config: Arc::new(config),
            registry,
            renderer,
            http,
        })
    }
}
