//! BERT probability scorer for the company-origin classifier
//!
//! Tokenize, run the encoder, pool the `[CLS]` state through the BERT pooler
//! (`tanh(dense(cls))`), then apply the dense head layers in order. The head
//! ends in a single sigmoid unit.

use crate::company::ProbabilityScorer;
use crate::config::{Activation, CompanyModelConfig};
use crate::model_loader::model_err;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use pillsquad_core::{Error, Result};
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

pub struct BertScorer {
    name: String,
    tokenizer: Tokenizer,
    model: BertModel,
    pooler: Linear,
    head: Vec<(Linear, Activation)>,
    device: Device,
}

impl BertScorer {
    /// Resolve and load every artifact named in `config`
    pub fn load(config: &CompanyModelConfig, device: &Device) -> Result<Self> {
        let config_path = config.config.resolve_path()?;
        let tokenizer_path = config.tokenizer.resolve_path()?;
        let weights_path = config.weights.resolve_path()?;
        let head_path = config.head.resolve_path()?;

        let bert_config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).map_err(|e| {
                Error::data_load(format!("failed to read {}: {}", config_path.display(), e))
            })?,
        )
        .map_err(|e| Error::data_load(format!("failed to parse BERT config: {e}")))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::data_load(format!("failed to load tokenizer: {e}")))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(|e| Error::data_load(format!("failed to configure truncation: {e}")))?;

        // SAFETY: the weight file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, device)
                .map_err(|e| Error::data_load(format!("failed to load BERT weights: {e}")))?
        };

        let model = BertModel::load(vb.clone(), &bert_config)
            .map_err(|e| Error::data_load(format!("failed to build BERT model: {e}")))?;

        let hidden = bert_config.hidden_size;
        let pooler = candle_nn::linear(hidden, hidden, vb.pp("pooler.dense"))
            .or_else(|_| candle_nn::linear(hidden, hidden, vb.pp("bert.pooler.dense")))
            .map_err(|e| Error::data_load(format!("BERT weights have no pooler: {e}")))?;

        let head = load_head(&head_path, &config.head_activations, device)?;

        tracing::info!(
            weights = %weights_path.display(),
            head_layers = head.len(),
            max_length = config.max_length,
            "BERT company scorer loaded"
        );

        Ok(Self {
            name: weights_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("bert")
                .to_string(),
            tokenizer,
            model,
            pooler,
            head,
            device: device.clone(),
        })
    }

    fn forward(&self, text: &str) -> candle_core::Result<f32> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| candle_core::Error::Msg(format!("tokenization failed: {e}")))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let mut x = self.pooler.forward(&cls)?.tanh()?;

        let last = self.head.len().saturating_sub(1);
        for (i, (layer, activation)) in self.head.iter().enumerate() {
            x = layer.forward(&x)?;
            x = if i == last {
                candle_nn::ops::sigmoid(&x)?
            } else {
                apply(*activation, &x)?
            };
        }

        let values = x.flatten_all()?.to_vec1::<f32>()?;
        values
            .first()
            .copied()
            .ok_or_else(|| candle_core::Error::Msg("head produced no output".to_string()))
    }
}

impl ProbabilityScorer for BertScorer {
    fn probability(&self, text: &str) -> Result<f32> {
        self.forward(text).map_err(model_err)
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

fn apply(activation: Activation, x: &Tensor) -> candle_core::Result<Tensor> {
    match activation {
        Activation::Relu => x.relu(),
        Activation::Gelu => x.gelu(),
        Activation::Tanh => x.tanh(),
        Activation::Sigmoid => candle_nn::ops::sigmoid(x),
        Activation::Linear => Ok(x.clone()),
    }
}

/// Read `layers.0`, `layers.1`, … until the first missing index
fn load_head(
    path: &Path,
    activations: &[Activation],
    device: &Device,
) -> Result<Vec<(Linear, Activation)>> {
    let mut tensors = candle_core::safetensors::load(path, device)
        .map_err(|e| Error::data_load(format!("failed to load head {}: {}", path.display(), e)))?;

    let mut layers = Vec::new();
    while let Some(weight) = tensors.remove(&format!("layers.{}.weight", layers.len())) {
        let bias = tensors.remove(&format!("layers.{}.bias", layers.len()));
        let activation = activations.get(layers.len()).copied().unwrap_or_default();
        layers.push((Linear::new(weight, bias), activation));
    }

    if layers.is_empty() {
        return Err(Error::data_load(format!(
            "head {} contains no `layers.0.weight` tensor",
            path.display()
        )));
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_head_layers_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("head.safetensors");

        let device = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert(
            "layers.0.weight".to_string(),
            Tensor::zeros((4, 8), DType::F32, &device).unwrap(),
        );
        tensors.insert(
            "layers.0.bias".to_string(),
            Tensor::zeros(4, DType::F32, &device).unwrap(),
        );
        tensors.insert(
            "layers.1.weight".to_string(),
            Tensor::zeros((1, 4), DType::F32, &device).unwrap(),
        );
        candle_core::safetensors::save(&tensors, &path).unwrap();

        let head = load_head(&path, &[Activation::Tanh], &device).unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(head[0].1, Activation::Tanh);

        // Zero weights and biases: sigmoid(0) = 0.5
        let x = Tensor::ones((1, 8), DType::F32, &device).unwrap();
        let h = apply(head[0].1, &head[0].0.forward(&x).unwrap()).unwrap();
        let out = candle_nn::ops::sigmoid(&head[1].0.forward(&h).unwrap()).unwrap();
        let p = out.flatten_all().unwrap().to_vec1::<f32>().unwrap()[0];
        assert!((p - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_head_without_layers_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("head.safetensors");

        let device = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert(
            "dense.weight".to_string(),
            Tensor::zeros((1, 4), DType::F32, &device).unwrap(),
        );
        candle_core::safetensors::save(&tensors, &path).unwrap();

        assert!(load_head(&path, &[], &device).is_err());
    }
}
