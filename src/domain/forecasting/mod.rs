//! Forecasting primitives shared by every model family.
//!
//! Windowing, min-max normalization, the `PricePredictor` seam and the
//! in-sample error metric live here; concrete models are fitted in
//! `application::forecasting`.

pub mod forecast;
pub mod metrics;
pub mod normalizer;
pub mod predictor;
pub mod windowing;

pub use forecast::predict_next;
pub use metrics::{historical_rmse, rmse};
pub use normalizer::MinMaxNormalizer;
pub use predictor::{ModelKind, PricePredictor};
pub use windowing::{DEFAULT_WINDOW_SIZE, WindowedDataset, prepare_windows};
