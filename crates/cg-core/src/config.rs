//! Configuration loading for the estimation pipeline.
//!
//! All fields are optional in the file; accessor methods apply defaults. The
//! label set and dosage table are injected here rather than hard-coded at the
//! call site, and model selection is decoupled from any presentation concern.

use crate::dosage::DosageTable;
use crate::gate;
use crate::label::Label;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which classifier backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Cnn,
    /// Color-prototype classifier; needs no weights, always available.
    #[default]
    Heuristic,
    Remote,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cnn" => Ok(BackendKind::Cnn),
            "heuristic" | "color" => Ok(BackendKind::Heuristic),
            "remote" => Ok(BackendKind::Remote),
            _ => Err(format!("unknown backend: '{s}'")),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    pub pipeline: Option<PipelineConfig>,
    pub model: Option<ModelConfig>,
    pub remote: Option<RemoteConfig>,
    /// Per-label dosage overrides in mg, on top of the built-in table.
    pub dosages: Option<HashMap<Label, u32>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PipelineConfig {
    pub confidence_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ModelConfig {
    pub backend: Option<BackendKind>,
    pub weights: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

/// Default hosted endpoint for the remote backend.
pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default hosted model name for the remote backend.
pub const DEFAULT_REMOTE_MODEL: &str = "gpt-4o-mini";

impl Config {
    /// Warning threshold, clamped into [0, 1]. Defaults to 0.5.
    pub fn confidence_threshold(&self) -> f32 {
        let configured = self
            .pipeline
            .as_ref()
            .and_then(|p| p.confidence_threshold)
            .unwrap_or(gate::DEFAULT_THRESHOLD);
        gate::clamp_threshold(configured)
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.model
            .as_ref()
            .and_then(|m| m.backend)
            .unwrap_or_default()
    }

    /// CNN weights path: configured value or the per-user cache location.
    pub fn weights_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.model.as_ref().and_then(|m| m.weights.clone()) {
            return Ok(path);
        }
        let dirs = project_dirs()?;
        Ok(dirs.cache_dir().join("cnn.safetensors"))
    }

    pub fn remote_endpoint(&self) -> &str {
        self.remote
            .as_ref()
            .and_then(|r| r.endpoint.as_deref())
            .unwrap_or(DEFAULT_REMOTE_ENDPOINT)
    }

    pub fn remote_model(&self) -> &str {
        self.remote
            .as_ref()
            .and_then(|r| r.model.as_deref())
            .unwrap_or(DEFAULT_REMOTE_MODEL)
    }

    /// Dosage table with any configured overrides applied.
    pub fn dosage_table(&self) -> DosageTable {
        match &self.dosages {
            Some(overrides) => DosageTable::with_overrides(overrides),
            None => DosageTable::default(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "cg").context("Could not determine config directory")
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    Ok(config)
}
