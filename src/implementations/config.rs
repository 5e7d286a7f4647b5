use log::debug;
use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::{ Path, PathBuf };
use thiserror::Error;

use crate::config::FillOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")] FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")] ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {message}")] InvalidValue {
        key: String,
        message: String,
    },
}

/// Defaults loaded from a YAML config file; command line flags win over these
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FillerConfig {
    /// Path to the `evm` binary
    pub evm_bin: Option<PathBuf>,

    /// Root of the filler package hierarchy
    pub filler_path: Option<PathBuf>,

    /// Directory that receives the fixtures
    pub output: Option<PathBuf>,

    /// Categories filled when none are given on the command line
    pub test_categories: Option<Vec<String>>,

    /// Worker pool size
    pub max_workers: Option<usize>,

    pub traces: Option<bool>,

    pub no_output_structure: Option<bool>,

    pub benchmark: Option<bool>,
}

impl FillerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: FillerConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        debug!("Loaded filler config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "max-workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Fill the gaps of `options` that were not set explicitly
    pub fn apply_defaults(&self, options: &mut FillOptions) {
        if options.evm_bin.is_none() {
            options.evm_bin = self.evm_bin.clone();
        }
        if let Some(path) = &self.filler_path {
            options.filler_path = path.clone();
        }
        if let Some(output) = &self.output {
            options.output = output.clone();
        }
        if options.test_categories.is_none() {
            options.test_categories = self.test_categories.clone();
        }
        if options.max_workers.is_none() {
            options.max_workers = self.max_workers;
        }
        options.traces |= self.traces.unwrap_or(false);
        options.no_output_structure |= self.no_output_structure.unwrap_or(false);
        options.benchmark |= self.benchmark.unwrap_or(false);
    }
}
