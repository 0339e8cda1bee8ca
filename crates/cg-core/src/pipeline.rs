//! Estimation pipeline: classify, look up the dosage, gate the confidence.
//!
//! Each call is independent and stateless; the estimator holds only read-only
//! state (backend weights, dosage table, threshold) and may be shared across
//! threads without coordination.

use crate::classifier::ClassifierBackend;
use crate::dosage::DosageTable;
use crate::error::EstimateError;
use crate::gate;
use crate::label::Label;
use crate::preprocess::decode_image;
use image::DynamicImage;
use serde::Serialize;

/// Final output of one estimation, derived deterministically from the
/// prediction and the dosage table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimationResult {
    pub label: Label,
    pub milligrams: u32,
    pub confidence: f32,
    pub low_confidence_warning: bool,
}

/// Composes a classifier backend with the dosage table and confidence gate.
pub struct Estimator {
    backend: Box<dyn ClassifierBackend>,
    table: DosageTable,
    threshold: f32,
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator")
            .field("backend", &self.backend.name())
            .field("table", &self.table)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl Estimator {
    /// Build an estimator. The backend must already be loaded and ready;
    /// model initialization never happens inside `estimate`.
    pub fn new(backend: Box<dyn ClassifierBackend>, table: DosageTable, threshold: f32) -> Self {
        Self {
            backend,
            table,
            threshold: gate::clamp_threshold(threshold),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn table(&self) -> &DosageTable {
        &self.table
    }

    /// Estimate the caffeine content of a decoded bitmap.
    ///
    /// Classifier failures ([`EstimateError::Decode`],
    /// [`EstimateError::ModelUnavailable`]) propagate unchanged: they are not
    /// transient, so there is no retry. On success the result is always a
    /// best-effort answer; low confidence is an annotation, not an error.
    pub fn estimate(&self, image: &DynamicImage) -> Result<EstimationResult, EstimateError> {
        let prediction = self.backend.classify(image)?;
        let milligrams = self.table.lookup(prediction.label);
        let low_confidence_warning = gate::warns(prediction.confidence, self.threshold);

        tracing::debug!(
            backend = self.backend.name(),
            label = %prediction.label,
            confidence = prediction.confidence,
            milligrams,
            warning = low_confidence_warning,
            "estimate"
        );

        Ok(EstimationResult {
            label: prediction.label,
            milligrams,
            confidence: prediction.confidence,
            low_confidence_warning,
        })
    }

    /// Decode raw image bytes, then estimate.
    pub fn estimate_bytes(&self, bytes: &[u8]) -> Result<EstimationResult, EstimateError> {
        let image = decode_image(bytes)?;
        self.estimate(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Prediction;

    /// Backend with a canned prediction, for exercising the orchestration
    /// without a model.
    struct FixedBackend(Prediction);

    impl ClassifierBackend for FixedBackend {
        fn classify(&self, _image: &DynamicImage) -> Result<Prediction, EstimateError> {
            Ok(self.0)
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct UnavailableBackend;

    impl ClassifierBackend for UnavailableBackend {
        fn classify(&self, _image: &DynamicImage) -> Result<Prediction, EstimateError> {
            Err(EstimateError::model_unavailable("not loaded"))
        }

        fn name(&self) -> &'static str {
            "unavailable"
        }
    }

    fn estimator_with(prediction: Prediction) -> Estimator {
        Estimator::new(
            Box::new(FixedBackend(prediction)),
            DosageTable::default(),
            gate::DEFAULT_THRESHOLD,
        )
    }

    #[test]
    fn test_confident_coffee() {
        let estimator = estimator_with(Prediction {
            label: Label::Coffee,
            confidence: 0.92,
        });
        let result = estimator.estimate(&DynamicImage::new_rgb8(8, 8)).unwrap();
        assert_eq!(
            result,
            EstimationResult {
                label: Label::Coffee,
                milligrams: 120,
                confidence: 0.92,
                low_confidence_warning: false,
            }
        );
    }

    #[test]
    fn test_uncertain_non_caffeine_warns() {
        let estimator = estimator_with(Prediction {
            label: Label::NonCaffeine,
            confidence: 0.40,
        });
        let result = estimator.estimate(&DynamicImage::new_rgb8(8, 8)).unwrap();
        assert_eq!(
            result,
            EstimationResult {
                label: Label::NonCaffeine,
                milligrams: 0,
                confidence: 0.40,
                low_confidence_warning: true,
            }
        );
    }

    #[test]
    fn test_boundary_confidence_does_not_warn() {
        let estimator = estimator_with(Prediction {
            label: Label::Cola,
            confidence: 0.5,
        });
        let result = estimator.estimate(&DynamicImage::new_rgb8(8, 8)).unwrap();
        assert!(!result.low_confidence_warning);
    }

    #[test]
    fn test_model_unavailable_propagates() {
        let estimator = Estimator::new(
            Box::new(UnavailableBackend),
            DosageTable::default(),
            gate::DEFAULT_THRESHOLD,
        );
        let err = estimator.estimate(&DynamicImage::new_rgb8(8, 8)).unwrap_err();
        assert!(matches!(err, EstimateError::ModelUnavailable(_)));
    }

    #[test]
    fn test_estimate_bytes_decode_failure() {
        let estimator = estimator_with(Prediction {
            label: Label::Coffee,
            confidence: 0.9,
        });
        let err = estimator.estimate_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, EstimateError::Decode(_)));
    }

    #[test]
    fn test_threshold_clamped() {
        let estimator = Estimator::new(
            Box::new(FixedBackend(Prediction {
                label: Label::Energy,
                confidence: 0.99,
            })),
            DosageTable::default(),
            7.0,
        );
        // Clamped to 1.0: 0.99 < 1.0 still warns, 1.0 would not
        let result = estimator.estimate(&DynamicImage::new_rgb8(8, 8)).unwrap();
        assert!(result.low_confidence_warning);
    }
}
