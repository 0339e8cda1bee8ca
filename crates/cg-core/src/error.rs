//! Error taxonomy for the estimation pipeline.
//!
//! Only two failure modes are part of the pipeline contract: the input image
//! cannot be decoded, or the classifier model is not ready. Dosage lookup and
//! the confidence gate are total and cannot fail. Low confidence is a warning
//! annotation on a successful result, never an error.

/// Failure of a single `estimate` call.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    /// The input bytes could not be interpreted as an image. Fatal for this
    /// call; decode failures are not transient, so callers must not retry.
    #[error("failed to decode input image: {0}")]
    Decode(#[from] image::ImageError),

    /// The classifier is not ready (missing weights file, missing API key).
    /// The caller must load a model before retrying.
    #[error("classifier model unavailable: {0}")]
    ModelUnavailable(String),

    /// Unexpected backend failure (tensor op, HTTP transport).
    #[error("inference failed: {0}")]
    Inference(anyhow::Error),
}

impl EstimateError {
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        EstimateError::ModelUnavailable(reason.into())
    }
}

impl From<candle_core::Error> for EstimateError {
    fn from(err: candle_core::Error) -> Self {
        EstimateError::Inference(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_reason() {
        let err = EstimateError::model_unavailable("no weights at /tmp/x");
        assert_eq!(
            err.to_string(),
            "classifier model unavailable: no weights at /tmp/x"
        );
    }
}
