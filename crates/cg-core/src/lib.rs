//! cg-core: Core library for Caffeine Guard
//!
//! This crate provides:
//! - A closed drink-label enumeration and a total label-to-milligram table
//! - Pluggable classifier backends (candle CNN, color prototypes, hosted
//!   vision API) behind one trait
//! - A confidence gate that flags predictions the user should double-check
//! - The estimation pipeline composing the three into a single call

pub mod classifier;
pub mod cnn;
pub mod config;
pub mod dosage;
pub mod error;
pub mod gate;
pub mod heuristic;
pub mod label;
pub mod pipeline;
pub mod preprocess;
pub mod remote;

// Re-exports
pub use classifier::{ClassifierBackend, Prediction};
pub use cnn::CnnClassifier;
pub use config::{default_config_path, load_config, BackendKind, Config};
pub use dosage::DosageTable;
pub use error::EstimateError;
pub use gate::DEFAULT_THRESHOLD;
pub use heuristic::ColorPrototypeClassifier;
pub use label::{Label, LABEL_COUNT};
pub use pipeline::{EstimationResult, Estimator};
pub use preprocess::{decode_image, INPUT_SIZE};
pub use remote::{ApiError, RemoteClassifier, API_KEY_ENV};

/// Create the appropriate compute device for the current platform
pub fn make_device() -> candle_core::Device {
    #[cfg(target_os = "macos")]
    {
        candle_core::Device::new_metal(0).unwrap_or(candle_core::Device::Cpu)
    }
    #[cfg(not(target_os = "macos"))]
    {
        candle_core::Device::Cpu
    }
}

/// Load the classifier backend the config selects.
///
/// Model initialization happens here, once, before the pipeline exists; a
/// backend that cannot become ready (missing weights, missing API key) fails
/// now rather than during `estimate`.
pub fn load_backend(config: &Config) -> Result<Box<dyn ClassifierBackend>, EstimateError> {
    let backend: Box<dyn ClassifierBackend> = match config.backend_kind() {
        BackendKind::Cnn => {
            let weights = config
                .weights_path()
                .map_err(|e| EstimateError::model_unavailable(e.to_string()))?;
            let device = make_device();
            Box::new(CnnClassifier::from_safetensors(&weights, &device)?)
        }
        BackendKind::Heuristic => Box::new(ColorPrototypeClassifier::new()),
        BackendKind::Remote => Box::new(RemoteClassifier::new(
            config.remote_endpoint(),
            config.remote_model(),
        )?),
    };
    backend.warmup()?;
    Ok(backend)
}

/// Build a ready estimator from configuration.
pub fn build_estimator(config: &Config) -> Result<Estimator, EstimateError> {
    let backend = load_backend(config)?;
    tracing::info!(backend = backend.name(), "classifier ready");
    Ok(Estimator::new(
        backend,
        config.dosage_table(),
        config.confidence_threshold(),
    ))
}
