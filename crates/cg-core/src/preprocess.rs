//! Image decode and CNN input preprocessing.
//!
//! The CNN consumes a fixed 64x64 RGB input. Preprocessing resizes the
//! bitmap, scales pixels to [0, 1], normalizes per channel, and lays the data
//! out CHW as a `(1, 3, 64, 64)` tensor.

use crate::error::EstimateError;
use candle_core::{Device, Tensor};
use image::imageops::FilterType;
use image::DynamicImage;

/// Side length of the square CNN input, in pixels.
pub const INPUT_SIZE: usize = 64;

/// Per-channel normalization constants (ImageNet mean/std).
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode raw bytes into a bitmap.
///
/// Undecodable input surfaces as [`EstimateError::Decode`]; no partial image
/// is ever produced.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, EstimateError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image)
}

/// Preprocess a bitmap into a normalized `(1, 3, 64, 64)` tensor.
pub fn to_input_tensor(image: &DynamicImage, device: &Device) -> Result<Tensor, EstimateError> {
    let resized = image.resize_exact(INPUT_SIZE as u32, INPUT_SIZE as u32, FilterType::Triangle);
    let rgb = resized.to_rgb8();

    // HWC -> CHW
    let mut data = Vec::with_capacity(3 * INPUT_SIZE * INPUT_SIZE);
    for c in 0..3 {
        for y in 0..INPUT_SIZE {
            for x in 0..INPUT_SIZE {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                let value = pixel[c] as f32 / 255.0;
                data.push((value - MEAN[c]) / STD[c]);
            }
        }
    }

    let tensor = Tensor::from_vec(data, (1, 3, INPUT_SIZE, INPUT_SIZE), device)?;
    Ok(tensor)
}
