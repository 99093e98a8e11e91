use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::domain::forecasting::DEFAULT_WINDOW_SIZE;

/// Hyper-parameters shared by the three model families.
///
/// Defaults: LSTM(50) and MLP(64, 32), 10 epochs, batch 16, Adam at 1e-3, no pinned seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    pub window_size: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub lstm_units: usize,
    pub mlp_layers: Vec<usize>,
    /// Seeds weight init and batch shuffling. `None` draws from the OS,
    /// so network results vary run to run.
    pub seed: Option<u64>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            epochs: 10,
            batch_size: 16,
            learning_rate: 0.001,
            lstm_units: 50,
            mlp_layers: vec![64, 32],
            seed: None,
        }
    }
}

impl TrainingSettings {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Fresh RNG for one model fit.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
