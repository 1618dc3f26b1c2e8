//! Shared application state

use crate::config::ApiConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use pillsquad_classifiers::{LoadedClassifiers, ModelsConfig};
use std::sync::Arc;
use tracing::info;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Models loaded once at startup
    pub classifiers: Arc<LoadedClassifiers>,

    /// Prometheus handle for `/metrics`; absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(classifiers: LoadedClassifiers, metrics_handle: Option<PrometheusHandle>) -> Self {
        Self {
            classifiers: Arc::new(classifiers),
            metrics_handle,
        }
    }

    /// Load the configured models; a configured model that fails to load is fatal
    pub fn from_config(
        config: &ApiConfig,
        metrics_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let models = match &config.models_config {
            Some(path) => {
                info!("Loading models from: {}", path.display());
                ModelsConfig::from_file(path)?
            }
            None => ModelsConfig::default(),
        };
        info!("Configured models: {:?}", models.configured());

        let classifiers = LoadedClassifiers::load(&models)?;
        Ok(Self::new(classifiers, metrics_handle))
    }
}
