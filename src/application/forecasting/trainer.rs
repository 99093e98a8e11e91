use tracing::info;

use super::linear::LinearModel;
use super::lstm::LstmNetwork;
use super::mlp::MlpNetwork;
use super::settings::TrainingSettings;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::{ModelKind, PricePredictor};

/// Fits one model family on normalized windows.
///
/// Inputs must be non-empty, rectangular and paired one to one with targets.
pub fn fit(
    kind: ModelKind,
    inputs: &[Vec<f64>],
    targets: &[f64],
    settings: &TrainingSettings,
) -> Result<Box<dyn PricePredictor>, ForecastError> {
    check_shapes(kind, inputs, targets)?;

    info!(
        "Training {} on {} windows of {} (epochs={}, batch={})",
        kind,
        inputs.len(),
        inputs[0].len(),
        if kind.is_iterative() { settings.epochs } else { 0 },
        settings.batch_size
    );

    let model: Box<dyn PricePredictor> = match kind {
        ModelKind::Recurrent => Box::new(LstmNetwork::fit(inputs, targets, settings)?),
        ModelKind::Feedforward => Box::new(MlpNetwork::fit(inputs, targets, settings)?),
        ModelKind::Linear => Box::new(LinearModel::fit(inputs, targets)?),
    };
    Ok(model)
}

fn check_shapes(
    kind: ModelKind,
    inputs: &[Vec<f64>],
    targets: &[f64],
) -> Result<(), ForecastError> {
    let failure = |reason: String| ForecastError::ModelFitFailure {
        model: kind,
        reason,
    };

    if inputs.is_empty() {
        return Err(failure("no training windows".to_string()));
    }
    if inputs.len() != targets.len() {
        return Err(failure(format!(
            "{} windows but {} targets",
            inputs.len(),
            targets.len()
        )));
    }
    let width = inputs[0].len();
    if width == 0 || inputs.iter().any(|w| w.len() != width) {
        return Err(failure("windows must share one non-zero length".to_string()));
    }
    if inputs.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
        return Err(failure("non-finite training value".to_string()));
    }
    Ok(())
}
