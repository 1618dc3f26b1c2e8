//! YAML configuration for the three model adapters
//!
//! ```yaml
//! device: cpu
//! ingredient:
//!   vectorizer: { path: models/ingredient/vectorizer.json }
//!   forest: { path: models/ingredient/forest.json }
//! company:
//!   config: { repo_id: klue/bert-base, filename: config.json }
//!   tokenizer: { repo_id: klue/bert-base, filename: tokenizer.json }
//!   weights: { path: models/company/bert.safetensors }
//!   head: { path: models/company/head.safetensors }
//!   head_activations: [relu]
//! image:
//!   weights: { path: models/resnet18_yes_no_classifier.pt }
//! ```
//!
//! A section that is absent leaves that model unconfigured.

use crate::model_loader::{DeviceType, ModelFormat, ModelSource};
use pillsquad_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub device: DeviceType,

    /// GPU index when `device` is not `cpu`
    #[serde(default)]
    pub device_index: usize,

    #[serde(default)]
    pub ingredient: Option<IngredientModelConfig>,

    #[serde(default)]
    pub company: Option<CompanyModelConfig>,

    #[serde(default)]
    pub image: Option<ImageModelConfig>,
}

/// Exported TF-IDF vectorizer and random forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientModelConfig {
    pub vectorizer: ModelSource,
    pub forest: ModelSource,
}

/// BERT encoder plus dense classification head
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyModelConfig {
    /// BERT `config.json`
    pub config: ModelSource,

    /// `tokenizer.json`
    pub tokenizer: ModelSource,

    /// Encoder weights (safetensors)
    pub weights: ModelSource,

    /// Head weights (safetensors, tensors `layers.{i}.weight` / `layers.{i}.bias`)
    pub head: ModelSource,

    /// Activation after each head layer except the last, which is always sigmoid
    #[serde(default)]
    pub head_activations: Vec<Activation>,

    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

/// ResNet-18 two-class weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageModelConfig {
    pub weights: ModelSource,

    /// Weight format; guessed from the file extension when absent
    #[serde(default)]
    pub format: Option<ModelFormat>,
}

/// Activation between dense head layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Gelu,
    Tanh,
    Sigmoid,
    Linear,
}

fn default_max_length() -> usize {
    128
}

impl ModelsConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid models config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read models config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Names of the configured models, for startup logging
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.ingredient.is_some() {
            names.push("ingredient");
        }
        if self.company.is_some() {
            names.push("company");
        }
        if self.image.is_some() {
            names.push("image");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_has_no_models() {
        let config = ModelsConfig::from_yaml("{}").unwrap();
        assert_eq!(config.device, DeviceType::Cpu);
        assert!(config.configured().is_empty());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
device: cuda
device_index: 1
ingredient:
  vectorizer: { path: v.json }
  forest: { path: f.json }
company:
  config: { repo_id: klue/bert-base, filename: config.json }
  tokenizer: { repo_id: klue/bert-base, filename: tokenizer.json }
  weights: { path: bert.safetensors }
  head: { path: head.safetensors }
  head_activations: [relu, tanh]
image:
  weights: { path: resnet.pt }
  format: pytorch
"#;
        let config = ModelsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.device, DeviceType::Cuda);
        assert_eq!(config.device_index, 1);
        assert_eq!(config.configured(), vec!["ingredient", "company", "image"]);

        let company = config.company.unwrap();
        assert_eq!(company.max_length, 128);
        assert_eq!(company.head_activations, vec![Activation::Relu, Activation::Tanh]);
        assert_eq!(config.image.unwrap().format, Some(ModelFormat::PyTorch));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ModelsConfig::from_yaml("ingredient: 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
