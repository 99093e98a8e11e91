use super::normalizer::MinMaxNormalizer;
use super::predictor::PricePredictor;
use crate::domain::errors::ForecastError;

/// Predicts the price following `series`, in original units.
///
/// Uses the last `window_size` raw prices, scaled with the frozen normalizer.
pub fn predict_next(
    predictor: &dyn PricePredictor,
    normalizer: &MinMaxNormalizer,
    series: &[f64],
    window_size: usize,
) -> Result<f64, ForecastError> {
    if window_size == 0 {
        return Err(ForecastError::InvalidWindow);
    }
    if series.len() < window_size {
        return Err(ForecastError::InsufficientData {
            len: series.len(),
            window: window_size,
        });
    }

    let window = normalizer.normalize_all(&series[series.len() - window_size..]);
    let price = normalizer.inverse(predictor.predict(&window)?);

    if !price.is_finite() {
        return Err(ForecastError::ModelFitFailure {
            model: predictor.kind(),
            reason: format!("next-price prediction is not finite ({})", price),
        });
    }
    Ok(price)
}
