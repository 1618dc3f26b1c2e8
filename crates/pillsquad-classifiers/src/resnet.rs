//! ResNet-18 backend for the product-image classifier

use crate::config::ImageModelConfig;
use crate::image::{ImageModel, CROP_SIZE};
use crate::model_loader::{model_err, ModelFormat};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Func, Module, VarBuilder};
use candle_transformers::models::resnet;
use pillsquad_core::{Error, Result};

/// Number of output classes (No, Yes)
const NUM_CLASSES: usize = 2;

pub struct ResNetModel {
    name: String,
    model: Func<'static>,
    device: Device,
}

impl ResNetModel {
    /// Load a two-class ResNet-18 from a torchvision-style state dict
    pub fn load(config: &ImageModelConfig, device: &Device) -> Result<Self> {
        let path = config.weights.resolve_path()?;
        let format = config.format.unwrap_or_else(|| ModelFormat::from_path(&path));

        let vb = match format {
            // SAFETY: the weight file is not modified while mapped.
            ModelFormat::SafeTensors => unsafe {
                VarBuilder::from_mmaped_safetensors(&[&path], DType::F32, device)
            },
            ModelFormat::PyTorch => VarBuilder::from_pth(&path, DType::F32, device),
        }
        .map_err(|e| Error::data_load(format!("failed to load {}: {}", path.display(), e)))?;

        let model = resnet::resnet18(NUM_CLASSES, vb)
            .map_err(|e| Error::data_load(format!("failed to build ResNet-18: {e}")))?;

        tracing::info!(weights = %path.display(), ?format, "ResNet-18 image model loaded");

        Ok(Self {
            name: path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("resnet18")
                .to_string(),
            model,
            device: device.clone(),
        })
    }

    fn forward(&self, pixels: &[f32]) -> candle_core::Result<usize> {
        let side = CROP_SIZE as usize;
        let input = Tensor::from_slice(pixels, (1, 3, side, side), &self.device)?;
        let logits = self.model.forward(&input)?;
        let class = logits.argmax(D::Minus1)?.flatten_all()?.to_vec1::<u32>()?;
        class
            .first()
            .map(|&c| c as usize)
            .ok_or_else(|| candle_core::Error::Msg("empty logits".to_string()))
    }
}

impl ImageModel for ResNetModel {
    fn predict_class(&self, pixels: &[f32]) -> Result<usize> {
        self.forward(pixels).map_err(model_err)
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
