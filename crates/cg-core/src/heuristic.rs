//! Color-prototype classifier backend.
//!
//! Deterministic fallback that needs no trained weights: the mean RGB of the
//! downscaled image is scored against one prototype color per label, and a
//! softmax over the negative distances produces the confidence distribution.

use crate::classifier::{argmax_prediction, softmax, ClassifierBackend, Prediction};
use crate::error::EstimateError;
use crate::label::{Label, LABEL_COUNT};
use image::imageops::FilterType;
use image::DynamicImage;

/// One representative color per label, indexed like [`Label::ALL`].
const PROTOTYPES: [[f32; 3]; LABEL_COUNT] = [
    [111.0, 78.0, 55.0],   // coffee: roast brown
    [56.0, 24.0, 12.0],    // cola: dark caramel
    [150.0, 105.0, 60.0],  // chocolate: milk-chocolate tan
    [140.0, 185.0, 100.0], // green_tea: matcha green
    [60.0, 200.0, 230.0],  // energy: neon cyan
    [225.0, 232.0, 240.0], // non_caffeine: clear / near white
];

/// Softmax temperature over negative RGB distances. Smaller values sharpen
/// the distribution.
const TEMPERATURE: f32 = 40.0;

/// Side length the image is averaged at before scoring.
const SAMPLE_SIZE: u32 = 16;

#[derive(Debug, Default)]
pub struct ColorPrototypeClassifier;

impl ColorPrototypeClassifier {
    pub fn new() -> Self {
        Self
    }

    fn mean_rgb(image: &DynamicImage) -> [f32; 3] {
        let small = image.resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle);
        let rgb = small.to_rgb8();
        let mut sums = [0.0_f64; 3];
        for pixel in rgb.pixels() {
            for c in 0..3 {
                sums[c] += pixel[c] as f64;
            }
        }
        let n = (SAMPLE_SIZE * SAMPLE_SIZE) as f64;
        [
            (sums[0] / n) as f32,
            (sums[1] / n) as f32,
            (sums[2] / n) as f32,
        ]
    }
}

impl ClassifierBackend for ColorPrototypeClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Prediction, EstimateError> {
        let mean = Self::mean_rgb(image);

        let mut scores = [0.0_f32; LABEL_COUNT];
        for (score, proto) in scores.iter_mut().zip(PROTOTYPES.iter()) {
            let dist = (0..3)
                .map(|c| (mean[c] - proto[c]).powi(2))
                .sum::<f32>()
                .sqrt();
            *score = -dist / TEMPERATURE;
        }

        let probs = softmax(&scores);
        let pred = argmax_prediction(&probs);
        tracing::debug!(
            label = %pred.label,
            confidence = pred.confidence,
            mean_rgb = ?mean,
            "color-prototype classification"
        );
        Ok(pred)
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn swatch(r: u8, g: u8, b: u8) -> DynamicImage {
        let img = image::RgbImage::from_pixel(32, 32, Rgb([r, g, b]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_prototype_swatches_classify_to_their_label() {
        let classifier = ColorPrototypeClassifier::new();
        for (i, proto) in PROTOTYPES.iter().enumerate() {
            let img = swatch(proto[0] as u8, proto[1] as u8, proto[2] as u8);
            let pred = classifier.classify(&img).unwrap();
            assert_eq!(pred.label, Label::ALL[i], "prototype {i}");
        }
    }

    #[test]
    fn test_confidence_in_unit_interval() {
        let classifier = ColorPrototypeClassifier::new();
        let pred = classifier.classify(&swatch(10, 200, 30)).unwrap();
        assert!(pred.confidence > 0.0 && pred.confidence <= 1.0);
    }

    #[test]
    fn test_deterministic() {
        let classifier = ColorPrototypeClassifier::new();
        let img = swatch(90, 60, 40);
        let a = classifier.classify(&img).unwrap();
        let b = classifier.classify(&img).unwrap();
        assert_eq!(a, b);
    }
}
