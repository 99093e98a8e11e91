use serde::{Deserialize, Serialize};

use crate::domain::errors::ForecastError;

/// Min-max scaler over the whole price history.
///
/// Parameters are frozen once fitted: the same `min`/`max` serve both
/// directions and are never refit on newer prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxNormalizer {
    min: f64,
    max: f64,
}

impl MinMaxNormalizer {
    /// Fits on `values`. A zero range is rejected instead of dividing by zero.
    pub fn fit(values: &[f64]) -> Result<Self, ForecastError> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData { len: 0, window: 0 });
        }

        for (index, value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(ForecastError::InvalidPrice {
                    index,
                    value: *value,
                });
            }
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        if max - min <= 0.0 {
            return Err(ForecastError::DegenerateSeries { value: min });
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Maps a price into [0, 1] (values outside the fitted range extrapolate).
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.range()
    }

    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.range() + self.min
    }

    pub fn normalize_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.normalize(*v)).collect()
    }
}
