use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    pub fn forward(&self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Linear => x,
        }
    }

    /// Derivative evaluated at the pre-activation `x`
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Self::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Linear => 1.0,
        }
    }
}

pub fn sigmoid(x: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(|val| 1.0 / (1.0 + (-val).exp()))
}

pub fn relu(x: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(|val| val.max(0.0))
}

pub fn relu_prime(x: ArrayView1<f64>) -> Array1<f64> {
    x.mapv(|val| if val > 0.0 { 1.0 } else { 0.0 })
}

/// Glorot/Xavier uniform initialisation: U(-l, l) with l = sqrt(6 / (fan_in + fan_out)).
pub fn glorot_uniform<R: Rng>(
    rows: usize,
    cols: usize,
    fan_in: usize,
    fan_out: usize,
    rng: &mut R,
) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.random_range(-limit..limit))
}

/// `a ⊗ b`, shape `(a.len(), b.len())`
pub fn outer(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(r, c)| a[r] * b[c])
}

/// Fully connected layer, `y = act(x W + b)` with `W` shaped (inputs, outputs).
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
    pub activation: Activation,
}

/// What a batched forward pass leaves behind for backprop
pub struct DenseCache {
    pub input: Array2<f64>,
    pub pre_activation: Array2<f64>,
}

pub struct DenseGradients {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl DenseLayer {
    pub fn new<R: Rng>(inputs: usize, outputs: usize, activation: Activation, rng: &mut R) -> Self {
        Self {
            weights: glorot_uniform(inputs, outputs, inputs, outputs, rng),
            bias: Array1::zeros(outputs),
            activation,
        }
    }

    pub fn outputs(&self) -> usize {
        self.bias.len()
    }

    /// Single-sample forward pass
    pub fn forward_one(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let z = x.dot(&self.weights) + &self.bias;
        z.mapv(|v| self.activation.forward(v))
    }

    /// Batched forward pass over rows of `x`
    pub fn forward(&self, x: Array2<f64>) -> (Array2<f64>, DenseCache) {
        let z = x.dot(&self.weights) + &self.bias;
        let a = z.mapv(|v| self.activation.forward(v));
        (
            a,
            DenseCache {
                input: x,
                pre_activation: z,
            },
        )
    }

    /// Returns parameter gradients and the gradient w.r.t. the layer input.
    pub fn backward(
        &self,
        cache: &DenseCache,
        grad_output: &Array2<f64>,
    ) -> (DenseGradients, Array2<f64>) {
        let activation = self.activation;
        let mut grad_z = cache.pre_activation.mapv(|z| activation.derivative(z));
        grad_z *= grad_output;

        let gradients = DenseGradients {
            weights: cache.input.t().dot(&grad_z),
            bias: grad_z.sum_axis(Axis(0)),
        };
        let grad_input = grad_z.dot(&self.weights.t());

        (gradients, grad_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_glorot_limits() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = glorot_uniform(10, 64, 10, 64, &mut rng);
        let limit = (6.0f64 / 74.0).sqrt();

        assert_eq!(w.dim(), (10, 64));
        assert!(w.iter().all(|v| v.abs() <= limit));
    }

    #[test]
    fn test_relu_and_sigmoid() {
        let x = array![-2.0, 0.0, 3.0];
        assert_eq!(relu(x.view()), array![0.0, 0.0, 3.0]);
        assert_eq!(relu_prime(x.view()), array![0.0, 0.0, 1.0]);
        assert!((sigmoid(x.view())[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_outer_product() {
        let m = outer(array![1.0, 2.0].view(), array![3.0, 4.0, 5.0].view());
        assert_eq!(m, array![[3.0, 4.0, 5.0], [6.0, 8.0, 10.0]]);
    }

    #[test]
    fn test_backward_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = DenseLayer::new(3, 2, Activation::Linear, &mut rng);
        let x = array![[0.2, -0.4, 0.9]];

        // Loss = sum of outputs, so grad_output is all ones
        let (_, cache) = layer.forward(x.clone());
        let (grads, _) = layer.backward(&cache, &Array2::ones((1, 2)));

        let eps = 1e-6;
        let mut bumped = layer.clone();
        bumped.weights[[1, 0]] += eps;
        let base: f64 = layer.forward(x.clone()).0.sum();
        let plus: f64 = bumped.forward(x).0.sum();

        assert!(((plus - base) / eps - grads.weights[[1, 0]]).abs() < 1e-5);
    }

    #[test]
    fn test_forward_one_agrees_with_batch() {
        let mut rng = StdRng::seed_from_u64(5);
        let layer = DenseLayer::new(4, 3, Activation::Relu, &mut rng);
        let x = array![[0.1, 0.5, 0.3, 0.9]];

        let (batch, _) = layer.forward(x.clone());
        let single = layer.forward_one(x.row(0));
        for (a, b) in batch.row(0).iter().zip(single.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
