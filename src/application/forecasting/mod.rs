//! Model fitting for the price forecaster.
//!
//! `engine` drives the whole pipeline; `trainer` dispatches to the three
//! model families, which share `layers` and the `optimizer`.

pub mod engine;
pub mod layers;
pub mod linear;
pub mod lstm;
pub mod mlp;
pub mod optimizer;
pub mod settings;
pub mod trainer;

pub use engine::{ForecastBundle, ForecastEngine, ModelForecast};
pub use settings::TrainingSettings;
