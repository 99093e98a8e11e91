use super::normalizer::MinMaxNormalizer;
use super::predictor::PricePredictor;
use crate::domain::errors::ForecastError;

/// Root-mean-squared deviation between two equally long series.
///
/// Returns 0.0 for empty input and `WindowMismatch` when the lengths differ.
pub fn rmse(predictions: &[f64], actuals: &[f64]) -> Result<f64, ForecastError> {
    if predictions.len() != actuals.len() {
        return Err(ForecastError::WindowMismatch {
            expected: actuals.len(),
            actual: predictions.len(),
        });
    }
    if predictions.is_empty() {
        return Ok(0.0);
    }

    let sq_err: f64 = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    Ok((sq_err / predictions.len() as f64).sqrt())
}

/// In-sample RMSE in original price units.
///
/// Runs `predictor` over its own training windows, so this measures fit
/// quality only. It is not a generalization estimate.
pub fn historical_rmse(
    predictor: &dyn PricePredictor,
    normalizer: &MinMaxNormalizer,
    inputs: &[Vec<f64>],
    targets: &[f64],
) -> Result<f64, ForecastError> {
    if inputs.len() != targets.len() {
        return Err(ForecastError::WindowMismatch {
            expected: inputs.len(),
            actual: targets.len(),
        });
    }

    let predictions: Vec<f64> = predictor
        .predict_batch(inputs)?
        .into_iter()
        .map(|p| normalizer.inverse(p))
        .collect();
    let actuals: Vec<f64> = targets.iter().map(|t| normalizer.inverse(*t)).collect();

    let value = rmse(&predictions, &actuals)?;
    if !value.is_finite() {
        return Err(ForecastError::ModelFitFailure {
            model: predictor.kind(),
            reason: "in-sample RMSE is not finite".to_string(),
        });
    }
    Ok(value)
}
