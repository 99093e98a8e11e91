use std::fmt;
use std::time::Instant;

use tracing::info;

use super::settings::TrainingSettings;
use super::trainer;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::{
    MinMaxNormalizer, ModelKind, PricePredictor, historical_rmse, predict_next, prepare_windows,
};

/// A fitted model with its in-sample error and next-price forecast.
pub struct ModelForecast {
    pub kind: ModelKind,
    pub predictor: Box<dyn PricePredictor>,
    /// RMSE over the training windows, original units
    pub in_sample_rmse: f64,
    /// Forecast for the point after the last observation, original units
    pub next_price: f64,
}

impl fmt::Debug for ModelForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelForecast")
            .field("kind", &self.kind)
            .field("predictor", &self.predictor.name())
            .field("in_sample_rmse", &self.in_sample_rmse)
            .field("next_price", &self.next_price)
            .finish()
    }
}

/// Every model fitted on one price series, plus the scaling they share.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct ForecastBundle {
    pub normalizer: MinMaxNormalizer,
    pub window_size: usize,
    pub training_samples: usize,
    pub forecasts: Vec<ModelForecast>,
}

impl ForecastBundle {
    pub fn forecast(&self, kind: ModelKind) -> Option<&ModelForecast> {
        self.forecasts.iter().find(|f| f.kind == kind)
    }

    /// Lowest in-sample RMSE; the earlier model wins a tie.
    pub fn best_model(&self) -> Option<&ModelForecast> {
        self.forecasts.iter().fold(None, |best, candidate| match best {
            Some(current) if current.in_sample_rmse <= candidate.in_sample_rmse => Some(current),
            _ => Some(candidate),
        })
    }

    /// Re-runs next-price prediction for `kind` on an arbitrary series.
    pub fn predict_next(
        &self,
        kind: ModelKind,
        series: &[f64],
    ) -> Option<Result<f64, ForecastError>> {
        self.forecast(kind).map(|f| {
            predict_next(
                f.predictor.as_ref(),
                &self.normalizer,
                series,
                self.window_size,
            )
        })
    }
}

pub struct ForecastEngine {
    settings: TrainingSettings,
}

impl ForecastEngine {
    pub fn new(settings: TrainingSettings) -> Self {
        Self { settings }
    }

    /// Windows the series, fits each model family in turn and scores it.
    pub fn initialize(&self, series: &[f64]) -> Result<ForecastBundle, ForecastError> {
        let window_size = self.settings.window_size;
        let (dataset, normalizer) = prepare_windows(series, window_size)?;

        info!(
            "Forecast engine: {} prices, {} windows of {} (range {:.2}..{:.2})",
            series.len(),
            dataset.len(),
            window_size,
            normalizer.min(),
            normalizer.max()
        );

        let mut forecasts = Vec::with_capacity(ModelKind::ALL.len());
        for kind in ModelKind::ALL {
            let started = Instant::now();
            let predictor = trainer::fit(kind, &dataset.inputs, &dataset.targets, &self.settings)?;

            let in_sample_rmse = historical_rmse(
                predictor.as_ref(),
                &normalizer,
                &dataset.inputs,
                &dataset.targets,
            )?;
            let next_price = predict_next(predictor.as_ref(), &normalizer, series, window_size)?;

            info!(
                "{} ready in {:.2?}: rmse={:.4}, next={:.2}",
                kind,
                started.elapsed(),
                in_sample_rmse,
                next_price
            );

            forecasts.push(ModelForecast {
                kind,
                predictor,
                in_sample_rmse,
                next_price,
            });
        }

        Ok(ForecastBundle {
            normalizer,
            window_size,
            training_samples: dataset.len(),
            forecasts,
        })
    }
}
