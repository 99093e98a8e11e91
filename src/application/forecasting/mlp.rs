use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use tracing::debug;

use super::layers::{Activation, DenseCache, DenseLayer};
use super::optimizer::Adam;
use super::settings::TrainingSettings;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::predictor::check_window;
use crate::domain::forecasting::{ModelKind, PricePredictor};

/// Feed-forward regressor: relu hidden layers and a single linear output.
#[derive(Debug, Clone)]
pub struct MlpNetwork {
    layers: Vec<DenseLayer>,
    window_size: usize,
}

impl MlpNetwork {
    pub fn fit(
        inputs: &[Vec<f64>],
        targets: &[f64],
        settings: &TrainingSettings,
    ) -> Result<Self, ForecastError> {
        let window_size = inputs.first().map(Vec::len).unwrap_or(0);
        let x = to_matrix(inputs, window_size)?;
        let y = Array2::from_shape_vec((targets.len(), 1), targets.to_vec())
            .map_err(|e| fit_failure(e.to_string()))?;

        let mut rng = settings.rng();
        let mut layers = Vec::with_capacity(settings.mlp_layers.len() + 1);
        let mut fan_in = window_size;
        for &units in &settings.mlp_layers {
            layers.push(DenseLayer::new(fan_in, units, Activation::Relu, &mut rng));
            fan_in = units;
        }
        layers.push(DenseLayer::new(fan_in, 1, Activation::Linear, &mut rng));

        let mut network = Self {
            layers,
            window_size,
        };

        let mut optimizer = Adam::new(settings.learning_rate);
        let batch_size = settings.batch_size.max(1);
        let mut order: Vec<usize> = (0..inputs.len()).collect();

        for epoch in 0..settings.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(batch_size) {
                let xb = x.select(Axis(0), batch);
                let yb = y.select(Axis(0), batch);
                epoch_loss += network.train_batch(xb, &yb, &mut optimizer) * batch.len() as f64;
            }

            let mse = epoch_loss / inputs.len() as f64;
            if !mse.is_finite() {
                return Err(fit_failure(format!("loss became {} at epoch {}", mse, epoch + 1)));
            }
            debug!("MLP epoch {}/{}: mse={:.6}", epoch + 1, settings.epochs, mse);
        }

        Ok(network)
    }

    pub fn hidden_layers(&self) -> Vec<usize> {
        self.layers[..self.layers.len() - 1]
            .iter()
            .map(DenseLayer::outputs)
            .collect()
    }

    /// One Adam step on a mini-batch. Returns the batch MSE before the update.
    fn train_batch(&mut self, xb: Array2<f64>, yb: &Array2<f64>, optimizer: &mut Adam) -> f64 {
        let mut caches: Vec<DenseCache> = Vec::with_capacity(self.layers.len());
        let mut activation = xb;
        for layer in &self.layers {
            let (out, cache) = layer.forward(activation);
            caches.push(cache);
            activation = out;
        }

        let error = &activation - yb;
        let n = error.len() as f64;
        let loss = error.mapv(|e| e * e).sum() / n;

        let mut grad = error.mapv(|e| 2.0 * e / n);
        let mut gradients = Vec::with_capacity(self.layers.len());
        for (layer, cache) in self.layers.iter().zip(&caches).rev() {
            let (layer_grads, grad_input) = layer.backward(cache, &grad);
            gradients.push(layer_grads);
            grad = grad_input;
        }
        gradients.reverse();

        optimizer.begin_step();
        for (l, (layer, g)) in self.layers.iter_mut().zip(&gradients).enumerate() {
            optimizer.apply(2 * l, &mut layer.weights, &g.weights);
            optimizer.apply(2 * l + 1, &mut layer.bias, &g.bias);
        }

        loss
    }
}

impl PricePredictor for MlpNetwork {
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError> {
        check_window(self.window_size, window)?;

        let mut activation = Array1::from(window.to_vec());
        for layer in &self.layers {
            activation = layer.forward_one(activation.view());
        }
        Ok(activation[0])
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Feedforward
    }
}

pub(crate) fn to_matrix(inputs: &[Vec<f64>], width: usize) -> Result<Array2<f64>, ForecastError> {
    let flat: Vec<f64> = inputs.iter().flatten().copied().collect();
    Array2::from_shape_vec((inputs.len(), width), flat).map_err(|e| {
        ForecastError::ModelFitFailure {
            model: ModelKind::Feedforward,
            reason: format!("ragged input windows: {}", e),
        }
    })
}

fn fit_failure(reason: String) -> ForecastError {
    ForecastError::ModelFitFailure {
        model: ModelKind::Feedforward,
        reason,
    }
}
