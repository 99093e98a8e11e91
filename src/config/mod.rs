//! Configuration for the cotton forecaster.
//!
//! Values come from environment variables (optionally a `.env` file),
//! organized by concern: data locations and training hyper-parameters.

mod data_config;
mod training_config;

pub use data_config::{DEFAULT_DATA_PATH, DataEnvConfig};
pub use training_config::{TrainingEnvConfig, TrainingOverrides, validate};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::application::forecasting::TrainingSettings;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub report_dir: Option<PathBuf>,
    pub training: TrainingSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Training settings are parsed but not validated.
    pub fn from_env() -> Result<Self> {
        let data = DataEnvConfig::from_env();
        let training = TrainingEnvConfig::from_env().context("Failed to load training config")?;

        Ok(Self {
            data_path: data.data_path,
            report_dir: data.report_dir,
            training,
        })
    }

    /// Layers a TOML settings file over the environment values.
    ///
    /// Values are not validated here; CLI flags may still replace them.
    pub fn apply_settings_file(&mut self, path: &Path) -> Result<()> {
        TrainingOverrides::from_file(path)?.apply(&mut self.training);
        Ok(())
    }
}
