//! Cotton price forecaster.
//!
//! Loads the sales history, fits the LSTM, MLP and linear models, and prints
//! the sales overview together with each model's next-price forecast.

use anyhow::{Context, Result};
use clap::Parser;
use cotton_forecast::application::forecasting::ForecastEngine;
use cotton_forecast::config::{Config, validate};
use cotton_forecast::domain::analytics::{SalesSummary, monthly_revenue};
use cotton_forecast::domain::ports::SalesDataSource;
use cotton_forecast::domain::sales::PriceSeries;
use cotton_forecast::domain::validation::SalesValidator;
use cotton_forecast::infrastructure::CsvSalesSource;
use cotton_forecast::interfaces::{ForecastReport, ForecastReporter};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Cotton sales analytics and price forecasting", long_about = None)]
struct Cli {
    /// Sales CSV (overrides SALES_DATA_PATH)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML file with training settings
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Window size (number of past prices per input)
    #[arg(short, long)]
    window: Option<usize>,

    /// Training epochs for both networks
    #[arg(short, long)]
    epochs: Option<usize>,

    /// Seed for reproducible network training
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the JSON report (overrides REPORT_DIR)
    #[arg(long)]
    json_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load config")?;
    if let Some(path) = &cli.settings {
        config.apply_settings_file(path)?;
    }
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(dir) = cli.json_dir {
        config.report_dir = Some(dir);
    }
    if let Some(window) = cli.window {
        config.training.window_size = window;
    }
    if let Some(epochs) = cli.epochs {
        config.training.epochs = epochs;
    }
    if let Some(seed) = cli.seed {
        config.training.seed = Some(seed);
    }
    validate(&config.training).context("Invalid training settings")?;

    info!("Loading sales history from {}", config.data_path.display());
    let source = CsvSalesSource::new(&config.data_path);
    let records = source
        .load()
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let records = SalesValidator::filter(records);
    if !SalesValidator::is_chronological(&records) {
        warn!("Sales are not in chronological order; forecasting uses the file order as given");
    }

    let summary =
        SalesSummary::from_records(&records).context("No valid sales left after validation")?;
    let monthly = monthly_revenue(&records);
    let series = PriceSeries::from_records(&records);

    let engine = ForecastEngine::new(config.training.clone());
    let bundle = engine
        .initialize(series.prices())
        .context("Failed to initialize forecasting models")?;

    if let Some(best) = bundle.best_model() {
        info!(
            "Best model: {} (in-sample RMSE {:.4})",
            best.kind, best.in_sample_rmse
        );
    }

    let report = ForecastReport::new(summary, monthly, &bundle);
    ForecastReporter::print(&report);

    if let Some(dir) = &config.report_dir {
        let path = ForecastReporter::save_json(&report, dir)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}
