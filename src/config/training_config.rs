//! Training hyper-parameters from environment variables and settings files.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::application::forecasting::TrainingSettings;
use crate::domain::forecasting::DEFAULT_WINDOW_SIZE;

pub struct TrainingEnvConfig;

impl TrainingEnvConfig {
    /// Parses the environment only; call [`validate`] once every override is applied.
    pub fn from_env() -> Result<TrainingSettings> {
        let defaults = TrainingSettings::default();

        let seed = match env::var("FORECAST_SEED") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("Failed to parse FORECAST_SEED")?,
            ),
            _ => None,
        };

        Ok(TrainingSettings {
            window_size: Self::parse_usize("FORECAST_WINDOW", DEFAULT_WINDOW_SIZE)?,
            epochs: Self::parse_usize("FORECAST_EPOCHS", defaults.epochs)?,
            batch_size: Self::parse_usize("FORECAST_BATCH_SIZE", defaults.batch_size)?,
            learning_rate: Self::parse_f64("FORECAST_LEARNING_RATE", defaults.learning_rate)?,
            lstm_units: Self::parse_usize("FORECAST_LSTM_UNITS", defaults.lstm_units)?,
            mlp_layers: match env::var("FORECAST_MLP_LAYERS") {
                Ok(raw) => parse_layers(&raw).context("Failed to parse FORECAST_MLP_LAYERS")?,
                Err(_) => defaults.mlp_layers,
            },
            seed,
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}

/// Partial settings read from a TOML file; present keys replace the current values.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingOverrides {
    pub window_size: Option<usize>,
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub learning_rate: Option<f64>,
    pub lstm_units: Option<usize>,
    pub mlp_layers: Option<Vec<usize>>,
    pub seed: Option<u64>,
}

impl TrainingOverrides {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid training settings TOML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load settings file {}", path.display()))
    }

    pub fn apply(self, settings: &mut TrainingSettings) {
        if let Some(v) = self.window_size {
            settings.window_size = v;
        }
        if let Some(v) = self.epochs {
            settings.epochs = v;
        }
        if let Some(v) = self.batch_size {
            settings.batch_size = v;
        }
        if let Some(v) = self.learning_rate {
            settings.learning_rate = v;
        }
        if let Some(v) = self.lstm_units {
            settings.lstm_units = v;
        }
        if let Some(v) = self.mlp_layers {
            settings.mlp_layers = v;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
    }
}

/// Rejects settings that cannot train anything.
pub fn validate(settings: &TrainingSettings) -> Result<()> {
    if settings.window_size == 0 {
        bail!("Window size must be at least 1");
    }
    if settings.batch_size == 0 {
        bail!("Batch size must be at least 1");
    }
    if settings.lstm_units == 0 {
        bail!("LSTM units must be at least 1");
    }
    if settings.mlp_layers.iter().any(|&w| w == 0) {
        bail!("MLP layer widths must be at least 1");
    }
    if !(settings.learning_rate.is_finite() && settings.learning_rate > 0.0) {
        bail!("Learning rate must be a positive number");
    }
    Ok(())
}

fn parse_layers(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .with_context(|| format!("Invalid layer width '{}'", s))
        })
        .collect()
}
