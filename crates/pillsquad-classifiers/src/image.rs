//! Product-image classifier
//!
//! Decodes an uploaded image, applies the ImageNet evaluation transform
//! (resize shorter side to 256, centre-crop 224, normalise) and asks an
//! [`ImageModel`] for the predicted class. Class 1 means the image shows a
//! flagged product.

use crate::classifier::{ClassificationResult, LabelSet, Verdict};
use image::imageops::{self, FilterType};
use image::DynamicImage;
use pillsquad_core::{Error, Result};
use std::sync::Arc;

/// Edge length of the shorter side after resizing
pub const RESIZE_SHORT_SIDE: u32 = 256;

/// Edge length of the square model input
pub const CROP_SIZE: u32 = 224;

/// Upper bound on the longer side after resizing (a 16:1 aspect ratio)
pub const MAX_RESIZED_LONG_SIDE: u32 = 4096;

/// Per-channel normalisation mean (RGB)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel normalisation std (RGB)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Predicts a class index from a preprocessed `3 x 224 x 224` CHW tensor
pub trait ImageModel: Send + Sync {
    fn predict_class(&self, pixels: &[f32]) -> Result<usize>;

    /// Identifier of the underlying model
    fn model_name(&self) -> &str;
}

/// Deterministic preprocessing into a normalised CHW buffer
pub fn preprocess(image: &DynamicImage) -> Result<Vec<f32>> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(Error::invalid_image("image has zero width or height"));
    }

    let (short, long) = if width <= height {
        (width, height)
    } else {
        (height, width)
    };
    let resized_long = resized_long_side(short, long).ok_or_else(|| {
        Error::invalid_image(format!(
            "image aspect ratio {width}x{height} is too extreme to classify"
        ))
    })?;
    let (new_w, new_h) = if width <= height {
        (RESIZE_SHORT_SIDE, resized_long)
    } else {
        (resized_long, RESIZE_SHORT_SIDE)
    };
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, new_w, new_h, FilterType::Triangle);

    let left = ((new_w - CROP_SIZE) as f32 / 2.0).round() as u32;
    let top = ((new_h - CROP_SIZE) as f32 / 2.0).round() as u32;
    let cropped = imageops::crop_imm(&resized, left, top, CROP_SIZE, CROP_SIZE).to_image();

    let plane = (CROP_SIZE * CROP_SIZE) as usize;
    let mut pixels = vec![0.0f32; 3 * plane];
    for (x, y, pixel) in cropped.enumerate_pixels() {
        let offset = (y * CROP_SIZE + x) as usize;
        for channel in 0..3 {
            let value = f32::from(pixel[channel]) / 255.0;
            pixels[channel * plane + offset] =
                (value - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel];
        }
    }

    Ok(pixels)
}

/// Longer side once the shorter side is scaled to [`RESIZE_SHORT_SIDE`];
/// `None` past [`MAX_RESIZED_LONG_SIDE`]
fn resized_long_side(short: u32, long: u32) -> Option<u32> {
    let scaled = u64::from(RESIZE_SHORT_SIDE)
        .checked_mul(u64::from(long))?
        .checked_div(u64::from(short))?;
    let scaled = u32::try_from(scaled).ok()?;
    (scaled <= MAX_RESIZED_LONG_SIDE).then_some(scaled)
}

pub struct ProductImageClassifier {
    model: Arc<dyn ImageModel>,
}

impl ProductImageClassifier {
    pub fn new(model: Arc<dyn ImageModel>) -> Self {
        Self { model }
    }

    /// Classify raw uploaded bytes in any format the `image` crate decodes
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<ClassificationResult> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| Error::invalid_image(format!("cannot identify image file: {e}")))?;
        let pixels = preprocess(&image)?;
        let class = self.model.predict_class(&pixels)?;

        let (verdict, score) = if class == 1 {
            (Verdict::Positive, 1.0)
        } else {
            (Verdict::Negative, 0.0)
        };

        tracing::debug!(
            model = self.model.model_name(),
            class,
            width = image.width(),
            height = image.height(),
            "image classified"
        );

        Ok(ClassificationResult::new(verdict, LabelSet::IMAGE, score))
    }
}
