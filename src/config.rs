//! Configuration management for the attrition risk engine

use crate::loader::DEFAULT_DATA_PATH;
use crate::models::logistic::{ClassWeight, Solver};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input dataset configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the HR attrition CSV
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

/// Split, classifier and evaluation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the stratified shuffle
    pub random_seed: u64,
    pub max_iter: usize,
    /// Step size, only used by the gradient descent solver
    pub learning_rate: f64,
    pub tolerance: f64,
    /// Inverse L2 regularization strength
    pub c: f64,
    pub class_weight: ClassWeight,
    pub solver: Solver,
    /// A row is labelled "at risk" only when its probability is strictly above this value
    pub decision_threshold: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 42,
            max_iter: 1000,
            learning_rate: 0.5,
            tolerance: 1e-6,
            c: 1.0,
            class_weight: ClassWeight::Balanced,
            solver: Solver::Newton,
            decision_threshold: 0.5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file plus `ATTRITION__*` environment overrides.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path plus environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            warn!(path = %path.as_ref().display(), "Configuration file not found, using defaults");
        }

        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("ATTRITION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data.path, PathBuf::from("HR-Employee-Attrition.csv"));
        assert_eq!(config.training.test_size, 0.2);
        assert_eq!(config.training.random_seed, 42);
        assert_eq!(config.training.class_weight, ClassWeight::Balanced);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_path("no/such/config.toml").unwrap();
        assert_eq!(config.training.max_iter, 1000);
        assert_eq!(config.training.decision_threshold, 0.5);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[data]\npath = \"data/hr.csv\"\n\n[training]\nrandom_seed = 7\nsolver = \"gradient_descent\"\nclass_weight = \"none\""
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.data.path, PathBuf::from("data/hr.csv"));
        assert_eq!(config.training.random_seed, 7);
        assert_eq!(config.training.solver, Solver::GradientDescent);
        assert_eq!(config.training.class_weight, ClassWeight::None);
        // untouched keys keep their defaults
        assert_eq!(config.training.test_size, 0.2);
        assert_eq!(config.logging.level, "info");
    }
}
