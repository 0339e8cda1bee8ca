//! Convolutional classifier backend using Candle.
//!
//! Small stock architecture: two conv+ReLU+max-pool blocks followed by a
//! dense head over the flattened feature map, softmax over the label set.
//! Weights are trained offline and loaded once from a safetensors file; the
//! backend never trains or mutates model state.

use crate::classifier::{argmax_prediction, softmax, ClassifierBackend, Prediction};
use crate::error::EstimateError;
use crate::label::LABEL_COUNT;
use crate::preprocess::{to_input_tensor, INPUT_SIZE};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, Linear, VarBuilder};
use image::DynamicImage;
use std::path::Path;

/// Channels after the first and second conv blocks.
const CONV1_CHANNELS: usize = 16;
const CONV2_CHANNELS: usize = 32;

/// Flattened feature size feeding the dense head: each pool halves the
/// spatial extent, so 64 -> 32 -> 16 per side.
const HEAD_INPUT: usize = CONV2_CHANNELS * (INPUT_SIZE / 4) * (INPUT_SIZE / 4);

/// CNN classifier with frozen, read-only weights.
#[derive(Debug)]
pub struct CnnClassifier {
    conv1: Conv2d,
    conv2: Conv2d,
    head: Linear,
    device: Device,
}

impl CnnClassifier {
    /// Load weights from a safetensors file.
    ///
    /// A missing or unreadable file is a [`EstimateError::ModelUnavailable`]:
    /// the caller must provide trained weights before classification.
    pub fn from_safetensors(path: &Path, device: &Device) -> Result<Self, EstimateError> {
        if !path.exists() {
            return Err(EstimateError::model_unavailable(format!(
                "weights file not found: {}",
                path.display()
            )));
        }

        tracing::info!("loading CNN weights from {}", path.display());
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device).map_err(|e| {
                EstimateError::model_unavailable(format!(
                    "failed to load weights from {}: {e}",
                    path.display()
                ))
            })?
        };
        Self::from_varbuilder(vb, device)
    }

    fn from_varbuilder(vb: VarBuilder, device: &Device) -> Result<Self, EstimateError> {
        let cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };
        let conv1 = candle_nn::conv2d(3, CONV1_CHANNELS, 3, cfg, vb.pp("conv1"))?;
        let conv2 = candle_nn::conv2d(CONV1_CHANNELS, CONV2_CHANNELS, 3, cfg, vb.pp("conv2"))?;
        let head = candle_nn::linear(HEAD_INPUT, LABEL_COUNT, vb.pp("head"))?;

        Ok(Self {
            conv1,
            conv2,
            head,
            device: device.clone(),
        })
    }

    fn forward(&self, input: &Tensor) -> Result<[f32; LABEL_COUNT], EstimateError> {
        let xs = input
            .apply(&self.conv1)?
            .relu()?
            .max_pool2d(2)?
            .apply(&self.conv2)?
            .relu()?
            .max_pool2d(2)?
            .flatten_from(1)?
            .apply(&self.head)?;

        let logits = xs.squeeze(0)?.to_vec1::<f32>()?;
        let mut scores = [0.0_f32; LABEL_COUNT];
        scores.copy_from_slice(&logits);
        Ok(scores)
    }
}

impl ClassifierBackend for CnnClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Prediction, EstimateError> {
        let input = to_input_tensor(image, &self.device)?;
        let scores = self.forward(&input)?;
        let probs = softmax(&scores);
        Ok(argmax_prediction(&probs))
    }

    fn name(&self) -> &'static str {
        "cnn"
    }
}
