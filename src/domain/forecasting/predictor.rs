use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::ForecastError;

/// The three model families compared by the forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Recurrent,
    Feedforward,
    Linear,
}

impl ModelKind {
    /// Fitting and reporting order.
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Recurrent,
        ModelKind::Feedforward,
        ModelKind::Linear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Recurrent => "LSTM",
            ModelKind::Feedforward => "MLP",
            ModelKind::Linear => "Linear Regression",
        }
    }

    /// Whether fitting runs gradient epochs (and thus depends on the RNG).
    pub fn is_iterative(&self) -> bool {
        !matches!(self, ModelKind::Linear)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recurrent" | "lstm" => Ok(ModelKind::Recurrent),
            "feedforward" | "mlp" => Ok(ModelKind::Feedforward),
            "linear" | "lr" => Ok(ModelKind::Linear),
            _ => Err(format!(
                "Invalid model kind: {}. Must be 'recurrent', 'feedforward' or 'linear'",
                s
            )),
        }
    }
}

/// A trained model mapping one normalized window to the next normalized price.
///
/// Implementations are immutable after fitting, so a fitted predictor can be
/// shared freely between readers.
pub trait PricePredictor: Send + Sync {
    /// Predict the next normalized value from `window` (oldest first).
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError>;

    /// Window length the model was fitted on
    fn window_size(&self) -> usize;

    fn kind(&self) -> ModelKind;

    fn name(&self) -> &str {
        self.kind().label()
    }

    fn predict_batch(&self, windows: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        windows.iter().map(|w| self.predict(w)).collect()
    }
}

/// Rejects windows whose length differs from what the model was fitted on.
pub fn check_window(expected: usize, window: &[f64]) -> Result<(), ForecastError> {
    if window.len() != expected {
        return Err(ForecastError::WindowMismatch {
            expected,
            actual: window.len(),
        });
    }
    Ok(())
}
