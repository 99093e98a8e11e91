//! Adam optimizer over ndarray parameters.
//!
//! ```text
//! m = beta1 * m + (1 - beta1) * g
//! v = beta2 * v + (1 - beta2) * g^2
//! alpha = lr * sqrt(1 - beta2^t) / (1 - beta1^t)
//! p = p - alpha * m / (sqrt(v) + epsilon)
//! ```

use ndarray::{Array, Dimension};

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// Steps taken so far, shared by all parameter slots
    t: i32,
    /// First and second moments, one pair per parameter slot
    moments: Vec<(Vec<f64>, Vec<f64>)>,
}

impl Adam {
    /// Adam with Keras defaults for everything but the learning rate.
    pub fn new(learning_rate: f64) -> Self {
        Self::with_params(learning_rate, 0.9, 0.999, 1e-7)
    }

    pub fn with_params(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
            moments: Vec::new(),
        }
    }

    pub fn timestep(&self) -> i32 {
        self.t
    }

    /// Starts a new update step. Call once per mini-batch, before `apply`.
    pub fn begin_step(&mut self) {
        self.t += 1;
    }

    /// Updates `param` in place from `grad`. `slot` identifies the parameter
    /// tensor across steps.
    pub fn apply<D: Dimension>(
        &mut self,
        slot: usize,
        param: &mut Array<f64, D>,
        grad: &Array<f64, D>,
    ) {
        if self.moments.len() <= slot {
            self.moments.resize(slot + 1, (Vec::new(), Vec::new()));
        }
        let t = self.t.max(1);
        let alpha = self.learning_rate * (1.0 - self.beta2.powi(t)).sqrt()
            / (1.0 - self.beta1.powi(t));

        let (m, v) = &mut self.moments[slot];
        if m.len() != param.len() {
            *m = vec![0.0; param.len()];
            *v = vec![0.0; param.len()];
        }

        for (k, (p, g)) in param.iter_mut().zip(grad.iter()).enumerate() {
            m[k] = self.beta1 * m[k] + (1.0 - self.beta1) * g;
            v[k] = self.beta2 * v[k] + (1.0 - self.beta2) * g * g;
            *p -= alpha * m[k] / (v[k].sqrt() + self.epsilon);
        }
    }
}
