//! Classifier backend trait and shared scoring helpers.
//!
//! A backend maps a decoded bitmap to one [`Prediction`]. Internally every
//! backend scores the full label set with a softmax so confidences sum to 1;
//! only the arg-max label and its confidence are surfaced. Classification is
//! total over decodable inputs and deterministic for fixed model state.

use crate::error::EstimateError;
use crate::label::{Label, LABEL_COUNT};
use image::DynamicImage;
use serde::Serialize;

/// A single classification outcome. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Softmax probability of `label`, in [0, 1].
    pub confidence: f32,
}

/// Trait for classification backends.
///
/// Model state is read-only after construction, so `classify` takes `&self`
/// and concurrent callers may share one backend without coordination. Any
/// model loading or network setup happens in the constructor, never here.
pub trait ClassifierBackend: Send + Sync {
    /// Classify a decoded bitmap. Never returns a partial prediction: either
    /// a label is produced or the call fails with an [`EstimateError`].
    fn classify(&self, image: &DynamicImage) -> Result<Prediction, EstimateError>;

    /// Short backend name for logs and CLI output.
    fn name(&self) -> &'static str;

    /// Run a dummy inference to initialize lazy resources.
    fn warmup(&self) -> Result<(), EstimateError> {
        let blank = DynamicImage::new_rgb8(8, 8);
        let _ = self.classify(&blank)?;
        Ok(())
    }
}

/// Softmax over raw per-label scores.
///
/// Subtracts the max score before exponentiating for numerical stability.
pub(crate) fn softmax(scores: &[f32; LABEL_COUNT]) -> [f32; LABEL_COUNT] {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0_f32; LABEL_COUNT];
    let mut sum = 0.0_f32;
    for (o, &s) in out.iter_mut().zip(scores.iter()) {
        *o = (s - max).exp();
        sum += *o;
    }
    for o in &mut out {
        *o /= sum;
    }
    out
}

/// Arg-max of a probability vector as a [`Prediction`].
pub(crate) fn argmax_prediction(probs: &[f32; LABEL_COUNT]) -> Prediction {
    let mut best = 0;
    for i in 1..LABEL_COUNT {
        if probs[i] > probs[best] {
            best = i;
        }
    }
    Prediction {
        label: Label::ALL[best],
        confidence: probs[best],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl ClassifierBackend for CountingBackend {
        fn classify(&self, _image: &DynamicImage) -> Result<Prediction, EstimateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Prediction {
                label: Label::Coffee,
                confidence: 1.0,
            })
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_default_warmup_runs_one_classification() {
        let backend = CountingBackend {
            calls: AtomicUsize::new(0),
        };
        backend.warmup().unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // Monotone in the input scores
        for w in probs.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_softmax_uniform_on_equal_scores() {
        let probs = softmax(&[0.0; LABEL_COUNT]);
        for p in probs {
            assert!((p - 1.0 / LABEL_COUNT as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_stable_on_large_scores() {
        let probs = softmax(&[1000.0, 1000.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs[0] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_argmax_prediction() {
        let pred = argmax_prediction(&[0.05, 0.05, 0.7, 0.1, 0.05, 0.05]);
        assert_eq!(pred.label, Label::Chocolate);
        assert!((pred.confidence - 0.7).abs() < 1e-6);
    }
}
