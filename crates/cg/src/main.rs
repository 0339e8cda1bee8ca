//! cg - Caffeine Guard CLI
//!
//! Estimate the caffeine content of a drink from a photo.
//!
//! Usage:
//!   cg estimate photo.jpg     Classify the photo and print label + mg
//!   cg labels                 Show the label set with dosages
//!   cg config-path            Print the config file location
//!   cg completions <shell>    Generate shell completions

use anyhow::{Context, Result};
use cg_core::{
    build_estimator, default_config_path, load_config, BackendKind, Config, EstimationResult,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cg", version, about = "Estimate caffeine content from a drink photo")]
struct Cli {
    /// Path to the config file (defaults to the per-user location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the caffeine content of an image file
    Estimate {
        /// Image file to classify
        image: PathBuf,

        /// Warning threshold in [0, 1], overriding the config
        #[arg(long)]
        threshold: Option<f32>,

        /// Classifier backend (cnn, heuristic, remote), overriding the config
        #[arg(long)]
        backend: Option<BackendKind>,

        /// CNN weights file, overriding the config
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the label set with dosages
    Labels,

    /// Print the default config file location
    ConfigPath,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_cli_config(cli.config.as_deref())?;

    match cli.command {
        Command::Estimate {
            image,
            threshold,
            backend,
            weights,
            json,
        } => cmd_estimate(config, &image, threshold, backend, weights, json),
        Command::Labels => cmd_labels(&config),
        Command::ConfigPath => {
            println!("{}", default_config_path()?.display());
            Ok(())
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cg", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_cli_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => load_config(&default_config_path()?),
    }
}

fn cmd_estimate(
    mut config: Config,
    image: &std::path::Path,
    threshold: Option<f32>,
    backend: Option<BackendKind>,
    weights: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    apply_overrides(&mut config, threshold, backend, weights);

    let estimator = build_estimator(&config)?;
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image file: {}", image.display()))?;
    let result = estimator.estimate_bytes(&bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn apply_overrides(
    config: &mut Config,
    threshold: Option<f32>,
    backend: Option<BackendKind>,
    weights: Option<PathBuf>,
) {
    if let Some(threshold) = threshold {
        config
            .pipeline
            .get_or_insert_with(Default::default)
            .confidence_threshold = Some(threshold);
    }
    if let Some(backend) = backend {
        config.model.get_or_insert_with(Default::default).backend = Some(backend);
    }
    if let Some(weights) = weights {
        config.model.get_or_insert_with(Default::default).weights = Some(weights);
    }
}

fn print_result(result: &EstimationResult) {
    println!(
        "{}  {}",
        result.label.to_string().bold(),
        format!("~{} mg caffeine", result.milligrams).cyan()
    );
    println!("confidence: {:.1}%", result.confidence * 100.0);
    if result.low_confidence_warning {
        println!(
            "{}",
            "warning: low confidence - treat this estimate with caution".yellow()
        );
    }
}

fn cmd_labels(config: &Config) -> Result<()> {
    let table = config.dosage_table();
    for (label, milligrams) in table.entries() {
        println!("{:<14} {:>4} mg", label.to_string(), milligrams);
    }
    Ok(())
}
