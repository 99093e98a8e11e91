// Model fitting, evaluation and the forecast engine
pub mod forecasting;
