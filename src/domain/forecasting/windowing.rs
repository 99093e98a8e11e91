use super::normalizer::MinMaxNormalizer;
use crate::domain::errors::ForecastError;

/// Default look-back: ten consecutive prices predict the next one.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Supervised samples cut from a normalized price series.
///
/// `inputs[i]` holds normalized prices `i..i + window_size` and `targets[i]`
/// the normalized price at `i + window_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedDataset {
    pub inputs: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub window_size: usize,
}

impl WindowedDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Fits the normalizer on the full series and slides a stride-1 window over it.
///
/// Deterministic: no shuffling, sample order follows the series.
pub fn prepare_windows(
    series: &[f64],
    window_size: usize,
) -> Result<(WindowedDataset, MinMaxNormalizer), ForecastError> {
    if window_size == 0 {
        return Err(ForecastError::InvalidWindow);
    }
    if series.len() <= window_size {
        return Err(ForecastError::InsufficientData {
            len: series.len(),
            window: window_size,
        });
    }

    let normalizer = MinMaxNormalizer::fit(series)?;
    let scaled = normalizer.normalize_all(series);

    let (inputs, targets): (Vec<Vec<f64>>, Vec<f64>) = scaled
        .windows(window_size + 1)
        .map(|w| (w[..window_size].to_vec(), w[window_size]))
        .unzip();

    Ok((
        WindowedDataset {
            inputs,
            targets,
            window_size,
        },
        normalizer,
    ))
}
