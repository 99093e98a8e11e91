use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linalg::traits::evd::EVDDecomposable;
use tracing::debug;

use crate::domain::errors::ForecastError;
use crate::domain::forecasting::predictor::check_window;
use crate::domain::forecasting::{ModelKind, PricePredictor};

/// Eigenvalues below `largest * RANK_TOLERANCE` are treated as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Ordinary least squares with intercept.
///
/// Solved in closed form through the eigen-decomposition of the centered
/// Gram matrix, keeping the minimum-norm solution when there are fewer
/// windows than lags. Fitting is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn fit(inputs: &[Vec<f64>], targets: &[f64]) -> Result<Self, ForecastError> {
        let n = inputs.len();
        let p = inputs.first().map(Vec::len).unwrap_or(0);
        if n == 0 || p == 0 {
            return Err(fit_failure("no training windows".to_string()));
        }

        let x_mean: Vec<f64> = (0..p)
            .map(|j| inputs.iter().map(|row| row[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = targets.iter().sum::<f64>() / n as f64;

        // G = Xcᵀ Xc, r = Xcᵀ yc
        let mut gram = vec![vec![0.0; p]; p];
        let mut moment = vec![0.0; p];
        for (row, &y) in inputs.iter().zip(targets) {
            let yc = y - y_mean;
            for a in 0..p {
                let xa = row[a] - x_mean[a];
                moment[a] += xa * yc;
                for b in 0..p {
                    gram[a][b] += xa * (row[b] - x_mean[b]);
                }
            }
        }

        let mut coefficients = vec![0.0; p];
        let mut rank = 0;
        let trace: f64 = (0..p).map(|a| gram[a][a]).sum();
        if trace > 0.0 {
            let matrix =
                DenseMatrix::from_2d_vec(&gram).map_err(|e| fit_failure(e.to_string()))?;
            let evd = matrix.evd(true).map_err(|e| fit_failure(e.to_string()))?;

            let largest = evd.d.iter().cloned().fold(0.0_f64, f64::max);
            let cutoff = largest * RANK_TOLERANCE;
            for (k, &eigenvalue) in evd.d.iter().enumerate() {
                if eigenvalue <= cutoff {
                    continue;
                }
                rank += 1;
                let projection: f64 =
                    (0..p).map(|r| *evd.V.get((r, k)) * moment[r]).sum::<f64>() / eigenvalue;
                for (r, w) in coefficients.iter_mut().enumerate() {
                    *w += projection * *evd.V.get((r, k));
                }
            }
        }

        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(w, m)| w * m)
                .sum::<f64>();

        if coefficients.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
            return Err(fit_failure("non-finite coefficients".to_string()));
        }
        debug!("Linear regression: {} lags, effective rank {}", p, rank);

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl PricePredictor for LinearModel {
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError> {
        check_window(self.coefficients.len(), window)?;
        Ok(self
            .coefficients
            .iter()
            .zip(window)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }

    fn window_size(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }
}

fn fit_failure(reason: String) -> ForecastError {
    ForecastError::ModelFitFailure {
        model: ModelKind::Linear,
        reason,
    }
}
