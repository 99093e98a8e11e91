// Sales history aggregates
pub mod analytics;

// Windowing, normalization, predictor seam and metrics
pub mod forecasting;

// Port interfaces
pub mod ports;

// Core sales types
pub mod sales;

// Input integrity checks
pub mod validation;

// Domain-specific error types
pub mod errors;
