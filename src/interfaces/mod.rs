// Terminal and JSON rendering of the forecast results
pub mod report;

pub use report::{ForecastReport, ForecastReporter, ModelReportEntry};
