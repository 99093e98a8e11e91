//! Single-layer LSTM regressor over scalar price windows.
//!
//! Gates are stacked `[input, forget, cell, output]` in every `4H` tensor.
//! The cell candidate and the cell output use relu, the three gates use
//! sigmoid, and a dense head maps the last hidden state to one price.
//! Training is full backpropagation through time with Adam.

use ndarray::{Array1, Array2, ArrayView1, Axis, s};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::layers::{glorot_uniform, outer, relu, relu_prime, sigmoid};
use super::optimizer::Adam;
use super::settings::TrainingSettings;
use crate::domain::errors::ForecastError;
use crate::domain::forecasting::predictor::check_window;
use crate::domain::forecasting::{ModelKind, PricePredictor};

#[derive(Debug, Clone)]
pub struct LstmNetwork {
    units: usize,
    window_size: usize,
    /// (4H) weights applied to the scalar input
    kernel: Array1<f64>,
    /// (4H, H)
    recurrent: Array2<f64>,
    /// (4H), forget slice starts at 1
    bias: Array1<f64>,
    head_weights: Array1<f64>,
    head_bias: Array1<f64>,
}

struct Step {
    x: f64,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    z_cell: Array1<f64>,
    input_gate: Array1<f64>,
    forget_gate: Array1<f64>,
    cell_candidate: Array1<f64>,
    output_gate: Array1<f64>,
    c: Array1<f64>,
}

struct Gradients {
    kernel: Array1<f64>,
    recurrent: Array2<f64>,
    bias: Array1<f64>,
    head_weights: Array1<f64>,
    head_bias: Array1<f64>,
}

impl Gradients {
    fn zeros(units: usize) -> Self {
        Self {
            kernel: Array1::zeros(4 * units),
            recurrent: Array2::zeros((4 * units, units)),
            bias: Array1::zeros(4 * units),
            head_weights: Array1::zeros(units),
            head_bias: Array1::zeros(1),
        }
    }
}

impl LstmNetwork {
    fn init<R: Rng>(units: usize, window_size: usize, rng: &mut R) -> Self {
        let mut bias: Array1<f64> = Array1::zeros(4 * units);
        bias.slice_mut(s![units..2 * units]).fill(1.0);

        Self {
            units,
            window_size,
            kernel: glorot_uniform(4 * units, 1, 1, 4 * units, rng).remove_axis(Axis(1)),
            recurrent: glorot_uniform(4 * units, units, units, 4 * units, rng),
            bias,
            head_weights: glorot_uniform(1, units, units, 1, rng).remove_axis(Axis(0)),
            head_bias: Array1::zeros(1),
        }
    }

    pub fn fit(
        inputs: &[Vec<f64>],
        targets: &[f64],
        settings: &TrainingSettings,
    ) -> Result<Self, ForecastError> {
        if settings.lstm_units == 0 {
            return Err(fit_failure("lstm_units must be at least 1".to_string()));
        }
        let window_size = inputs.first().map(Vec::len).unwrap_or(0);

        let mut rng = settings.rng();
        let mut network = Self::init(settings.lstm_units, window_size, &mut rng);
        let mut optimizer = Adam::new(settings.learning_rate);
        let batch_size = settings.batch_size.max(1);
        let mut order: Vec<usize> = (0..inputs.len()).collect();

        for epoch in 0..settings.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(batch_size) {
                let windows: Vec<&[f64]> = batch.iter().map(|&i| inputs[i].as_slice()).collect();
                let batch_targets: Vec<f64> = batch.iter().map(|&i| targets[i]).collect();

                let (loss, grads) = network.loss_and_gradients(&windows, &batch_targets);
                epoch_loss += loss * batch.len() as f64;

                optimizer.begin_step();
                optimizer.apply(0, &mut network.kernel, &grads.kernel);
                optimizer.apply(1, &mut network.recurrent, &grads.recurrent);
                optimizer.apply(2, &mut network.bias, &grads.bias);
                optimizer.apply(3, &mut network.head_weights, &grads.head_weights);
                optimizer.apply(4, &mut network.head_bias, &grads.head_bias);
            }

            let mse = epoch_loss / inputs.len() as f64;
            if !mse.is_finite() {
                return Err(fit_failure(format!("loss became {} at epoch {}", mse, epoch + 1)));
            }
            debug!("LSTM epoch {}/{}: mse={:.6}", epoch + 1, settings.epochs, mse);
        }

        Ok(network)
    }

    pub fn units(&self) -> usize {
        self.units
    }

    fn step(&self, x: f64, h_prev: &Array1<f64>, c_prev: &Array1<f64>) -> Step {
        let h = self.units;
        let z = &self.kernel * x + self.recurrent.dot(h_prev) + &self.bias;

        let input_gate = sigmoid(z.slice(s![0..h]));
        let forget_gate = sigmoid(z.slice(s![h..2 * h]));
        let z_cell = z.slice(s![2 * h..3 * h]).to_owned();
        let cell_candidate = relu(z_cell.view());
        let output_gate = sigmoid(z.slice(s![3 * h..4 * h]));

        let c = &forget_gate * c_prev + &input_gate * &cell_candidate;

        Step {
            x,
            h_prev: h_prev.clone(),
            c_prev: c_prev.clone(),
            z_cell,
            input_gate,
            forget_gate,
            cell_candidate,
            output_gate,
            c,
        }
    }

    fn hidden(step: &Step) -> Array1<f64> {
        &step.output_gate * &relu(step.c.view())
    }

    /// Runs the window through the cell, returning per-step state and the
    /// final hidden vector.
    fn unroll(&self, window: &[f64]) -> (Vec<Step>, Array1<f64>) {
        let mut h: Array1<f64> = Array1::zeros(self.units);
        let mut c: Array1<f64> = Array1::zeros(self.units);
        let mut steps = Vec::with_capacity(window.len());

        for &x in window {
            let step = self.step(x, &h, &c);
            h = Self::hidden(&step);
            c = step.c.clone();
            steps.push(step);
        }

        (steps, h)
    }

    fn head(&self, h: ArrayView1<f64>) -> f64 {
        h.dot(&self.head_weights) + self.head_bias[0]
    }

    /// Mean squared error over the batch and its gradient w.r.t. every parameter.
    fn loss_and_gradients(&self, windows: &[&[f64]], targets: &[f64]) -> (f64, Gradients) {
        let units = self.units;
        let n = windows.len() as f64;
        let mut grads = Gradients::zeros(units);
        let mut loss = 0.0;

        for (window, &target) in windows.iter().zip(targets) {
            let (steps, h_last) = self.unroll(window);
            let error = self.head(h_last.view()) - target;
            loss += error * error;

            let dy = 2.0 * error / n;
            grads.head_weights.scaled_add(dy, &h_last);
            grads.head_bias[0] += dy;

            let mut dh = &self.head_weights * dy;
            let mut dc_next: Array1<f64> = Array1::zeros(units);

            for step in steps.iter().rev() {
                let relu_c = relu(step.c.view());
                let d_output = &dh * &relu_c;
                let dc = dc_next + &dh * &step.output_gate * &relu_prime(step.c.view());

                let d_input = &dc * &step.cell_candidate;
                let d_cell = &dc * &step.input_gate;
                let d_forget = &dc * &step.c_prev;
                dc_next = &dc * &step.forget_gate;

                let mut dz: Array1<f64> = Array1::zeros(4 * units);
                dz.slice_mut(s![0..units])
                    .assign(&(d_input * &step.input_gate.mapv(|g| g * (1.0 - g))));
                dz.slice_mut(s![units..2 * units])
                    .assign(&(d_forget * &step.forget_gate.mapv(|g| g * (1.0 - g))));
                dz.slice_mut(s![2 * units..3 * units])
                    .assign(&(d_cell * &relu_prime(step.z_cell.view())));
                dz.slice_mut(s![3 * units..4 * units])
                    .assign(&(d_output * &step.output_gate.mapv(|g| g * (1.0 - g))));

                grads.kernel.scaled_add(step.x, &dz);
                grads.recurrent += &outer(dz.view(), step.h_prev.view());
                grads.bias += &dz;
                dh = self.recurrent.t().dot(&dz);
            }
        }

        (loss / n, grads)
    }
}

impl PricePredictor for LstmNetwork {
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError> {
        check_window(self.window_size, window)?;
        let (_, h) = self.unroll(window);
        Ok(self.head(h.view()))
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Recurrent
    }
}

fn fit_failure(reason: String) -> ForecastError {
    ForecastError::ModelFitFailure {
        model: ModelKind::Recurrent,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_batch() -> (Vec<Vec<f64>>, Vec<f64>) {
        (
            vec![vec![0.1, 0.4, 0.3, 0.8], vec![0.9, 0.2, 0.6, 0.5]],
            vec![0.7, 0.35],
        )
    }

    fn batch_loss(net: &LstmNetwork, inputs: &[Vec<f64>], targets: &[f64]) -> f64 {
        let windows: Vec<&[f64]> = inputs.iter().map(Vec::as_slice).collect();
        net.loss_and_gradients(&windows, targets).0
    }

    #[test]
    fn test_forget_bias_starts_at_one() {
        let mut rng = StdRng::seed_from_u64(0);
        let net = LstmNetwork::init(3, 5, &mut rng);

        assert_eq!(net.bias.slice(s![0..3]).sum(), 0.0);
        assert_eq!(net.bias.slice(s![3..6]).sum(), 3.0);
        assert_eq!(net.recurrent.dim(), (12, 3));
    }

    #[test]
    fn test_backprop_through_time_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(21);
        let net = LstmNetwork::init(3, 4, &mut rng);
        let (inputs, targets) = sample_batch();
        let windows: Vec<&[f64]> = inputs.iter().map(Vec::as_slice).collect();
        let (_, grads) = net.loss_and_gradients(&windows, &targets);

        let eps = 1e-6;
        let numeric = |perturb: &dyn Fn(&mut LstmNetwork, f64)| -> f64 {
            let mut plus = net.clone();
            perturb(&mut plus, eps);
            let mut minus = net.clone();
            perturb(&mut minus, -eps);
            (batch_loss(&plus, &inputs, &targets) - batch_loss(&minus, &inputs, &targets))
                / (2.0 * eps)
        };

        for k in [0, 4, 7, 11] {
            let approx = numeric(&|n: &mut LstmNetwork, d: f64| n.kernel[k] += d);
            assert!((approx - grads.kernel[k]).abs() < 1e-6, "kernel[{}]", k);

            let approx = numeric(&|n: &mut LstmNetwork, d: f64| n.bias[k] += d);
            assert!((approx - grads.bias[k]).abs() < 1e-6, "bias[{}]", k);

            let approx = numeric(&|n: &mut LstmNetwork, d: f64| n.recurrent[[k, 1]] += d);
            assert!((approx - grads.recurrent[[k, 1]]).abs() < 1e-6, "recurrent[{}]", k);
        }

        let approx = numeric(&|n: &mut LstmNetwork, d: f64| n.head_weights[2] += d);
        assert!((approx - grads.head_weights[2]).abs() < 1e-6);
        let approx = numeric(&|n: &mut LstmNetwork, d: f64| n.head_bias[0] += d);
        assert!((approx - grads.head_bias[0]).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (inputs, targets) = sample_batch();
        let settings = TrainingSettings {
            lstm_units: 8,
            ..TrainingSettings::default()
        }
        .with_seed(5);

        let a = LstmNetwork::fit(&inputs, &targets, &settings).unwrap();
        let b = LstmNetwork::fit(&inputs, &targets, &settings).unwrap();

        assert_eq!(a.predict(&inputs[0]).unwrap(), b.predict(&inputs[0]).unwrap());
        assert_eq!(a.units(), 8);
    }

    #[test]
    fn test_training_reduces_error() {
        let (inputs, targets) = sample_batch();
        let base = TrainingSettings {
            lstm_units: 6,
            learning_rate: 0.01,
            ..TrainingSettings::default()
        }
        .with_seed(13);

        let untrained = LstmNetwork::fit(&inputs, &targets, &base.clone().with_epochs(0)).unwrap();
        let trained = LstmNetwork::fit(&inputs, &targets, &base.with_epochs(300)).unwrap();

        assert!(
            batch_loss(&trained, &inputs, &targets) < batch_loss(&untrained, &inputs, &targets)
        );
    }

    #[test]
    fn test_zero_units_is_a_fit_failure() {
        let (inputs, targets) = sample_batch();
        let settings = TrainingSettings {
            lstm_units: 0,
            ..TrainingSettings::default()
        };

        assert!(matches!(
            LstmNetwork::fit(&inputs, &targets, &settings),
            Err(ForecastError::ModelFitFailure {
                model: ModelKind::Recurrent,
                ..
            })
        ));
    }
}
