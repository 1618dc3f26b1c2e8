//! Model artifact resolution and device selection

#[cfg(feature = "ml-models")]
use candle_core::Device;
use pillsquad_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a single model artifact lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSource {
    /// File inside a Hugging Face Hub repository, downloaded into the local cache
    HuggingFace {
        repo_id: String,
        filename: String,
        #[serde(default)]
        revision: Option<String>,
    },

    /// File on the local file system
    LocalPath { path: PathBuf },
}

impl ModelSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::LocalPath { path: path.into() }
    }

    /// Resolve to a readable local file, downloading from the Hub when needed
    pub fn resolve_path(&self) -> Result<PathBuf> {
        match self {
            Self::LocalPath { path } => {
                if !path.exists() {
                    return Err(Error::data_load(format!(
                        "model file not found: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
            Self::HuggingFace {
                repo_id,
                filename,
                revision,
            } => fetch_from_hub(repo_id, filename, revision.as_deref()),
        }
    }
}

#[cfg(feature = "ml-models")]
fn fetch_from_hub(repo_id: &str, filename: &str, revision: Option<&str>) -> Result<PathBuf> {
    use hf_hub::{api::sync::Api, Repo, RepoType};

    let api = Api::new()
        .map_err(|e| Error::data_load(format!("failed to initialise HF API: {e}")))?;

    let repo = api.repo(Repo::with_revision(
        repo_id.to_string(),
        RepoType::Model,
        revision.unwrap_or("main").to_string(),
    ));

    tracing::info!(repo = %repo_id, file = %filename, "fetching model artifact");
    repo.get(filename)
        .map_err(|e| Error::data_load(format!("failed to download {filename} from {repo_id}: {e}")))
}

#[cfg(not(feature = "ml-models"))]
fn fetch_from_hub(repo_id: &str, filename: &str, _revision: Option<&str>) -> Result<PathBuf> {
    Err(Error::config(format!(
        "{filename} from {repo_id}: Hugging Face sources require the 'ml-models' feature"
    )))
}

/// Device type for inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Cpu,
    Cuda,
    Metal,
}

/// Create a candle device; `index` selects the GPU
#[cfg(feature = "ml-models")]
pub fn create_device(device: DeviceType, index: usize) -> Result<Device> {
    match device {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda => Device::new_cuda(index)
            .map_err(|e| Error::config(format!("failed to create CUDA device {index}: {e}"))),
        DeviceType::Metal => Device::new_metal(index)
            .map_err(|e| Error::config(format!("failed to create Metal device {index}: {e}"))),
    }
}

/// Weight file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    SafeTensors,
    PyTorch,
}

impl ModelFormat {
    /// Guess from the file extension; anything but `.safetensors` is a torch pickle
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("safetensors") => Self::SafeTensors,
            _ => Self::PyTorch,
        }
    }
}

/// Map a candle failure into the crate error
#[cfg(feature = "ml-models")]
pub(crate) fn model_err(e: candle_core::Error) -> Error {
    Error::classifier(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_yaml() {
        let local: ModelSource = serde_yaml::from_str("path: /models/forest.json").unwrap();
        assert_eq!(local, ModelSource::local("/models/forest.json"));

        let hub: ModelSource = serde_yaml::from_str(
            "repo_id: pill-squad/company-bert\nfilename: model.safetensors\nrevision: v2\n",
        )
        .unwrap();
        assert!(matches!(
            hub,
            ModelSource::HuggingFace { ref revision, .. } if revision.as_deref() == Some("v2")
        ));
    }

    #[test]
    fn test_missing_local_file() {
        let err = ModelSource::local("/nonexistent/model.pt")
            .resolve_path()
            .unwrap_err();
        assert!(matches!(err, Error::DataLoad(_)));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ModelFormat::from_path(Path::new("resnet18.safetensors")),
            ModelFormat::SafeTensors
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("resnet18_yes_no_classifier.pt")),
            ModelFormat::PyTorch
        );
    }

    #[cfg(not(feature = "ml-models"))]
    #[test]
    fn test_hub_source_needs_ml_models() {
        let hub: ModelSource =
            serde_yaml::from_str("repo_id: klue/bert-base\nfilename: config.json\n").unwrap();
        assert!(matches!(hub.resolve_path(), Err(Error::Config(_))));
    }

    #[cfg(feature = "ml-models")]
    #[test]
    fn test_cpu_device() {
        assert!(create_device(DeviceType::Cpu, 0).unwrap().is_cpu());
    }
}
