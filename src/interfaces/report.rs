use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::application::forecasting::ForecastBundle;
use crate::domain::analytics::{MonthlyRevenue, SalesSummary};
use crate::domain::forecasting::ModelKind;

const WIDTH: usize = 72;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReportEntry {
    pub model: ModelKind,
    pub label: String,
    /// Error over the training windows themselves, R$
    pub in_sample_rmse: f64,
    pub next_price: f64,
}

/// Everything the terminal report shows, in a serializable shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub timestamp: DateTime<Utc>,
    pub summary: SalesSummary,
    pub monthly: Vec<MonthlyRevenue>,
    pub window_size: usize,
    pub training_samples: usize,
    pub price_min: f64,
    pub price_max: f64,
    pub models: Vec<ModelReportEntry>,
    pub best_model: Option<ModelKind>,
}

impl ForecastReport {
    pub fn new(summary: SalesSummary, monthly: Vec<MonthlyRevenue>, bundle: &ForecastBundle) -> Self {
        Self {
            timestamp: Utc::now(),
            summary,
            monthly,
            window_size: bundle.window_size,
            training_samples: bundle.training_samples,
            price_min: bundle.normalizer.min(),
            price_max: bundle.normalizer.max(),
            models: bundle
                .forecasts
                .iter()
                .map(|f| ModelReportEntry {
                    model: f.kind,
                    label: f.kind.label().to_string(),
                    in_sample_rmse: f.in_sample_rmse,
                    next_price: f.next_price,
                })
                .collect(),
            best_model: bundle.best_model().map(|f| f.kind),
        }
    }

    /// Models ordered by in-sample RMSE, best first. Ties keep fitting order.
    pub fn ranking(&self) -> Vec<&ModelReportEntry> {
        let mut ranked: Vec<&ModelReportEntry> = self.models.iter().collect();
        ranked.sort_by(|a, b| a.in_sample_rmse.total_cmp(&b.in_sample_rmse));
        ranked
    }
}

pub struct ForecastReporter;

impl ForecastReporter {
    pub fn print(report: &ForecastReport) {
        Self::print_overview(report);
        Self::print_revenue(report);
        Self::print_extremes(report);
        Self::print_forecasts(report);
        Self::print_comparison(report);
        println!("{}\n", "=".repeat(WIDTH));
    }

    /// Writes `forecast_report_<timestamp>.json` under `dir` and returns its path.
    pub fn save_json(report: &ForecastReport, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        let filename = format!(
            "forecast_report_{}.json",
            report.timestamp.format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);

        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        file.write_all(json.as_bytes())
            .context("Failed to write report file")?;

        info!("Report saved to {}", path.display());
        Ok(path)
    }

    fn header(title: &str) {
        println!("\n{}", "=".repeat(WIDTH));
        println!("{}", title);
        println!("{}", "=".repeat(WIDTH));
    }

    fn print_overview(report: &ForecastReport) {
        let s = &report.summary;
        Self::header("COTTON SALES OVERVIEW");
        println!("  Sales:          {}", s.sale_count);
        println!(
            "  Period:         {} .. {}",
            s.first_date.format("%d/%m/%Y"),
            s.last_date.format("%d/%m/%Y")
        );
        println!("  Quantity sold:  {:.2}", s.total_quantity);
        println!("  Mean price:     {}", brl(s.mean_price));
        println!("  Std deviation:  {}", brl(s.price_std_dev));
    }

    fn print_revenue(report: &ForecastReport) {
        Self::header("REVENUE");
        println!(
            "  Total revenue:  R$ {:.2}   ({} sales)",
            report.summary.total_revenue.round_dp(2),
            report.summary.sale_count
        );
        println!(
            "  Gross value:    R$ {:.2}   (price x quantity)",
            report.summary.gross_sales_value.round_dp(2)
        );
        if report.monthly.is_empty() {
            return;
        }
        println!();
        println!("  {:<8} | {:>16} | {:>10} | {:>6}", "Month", "Gross value", "Quantity", "Sales");
        println!("  {}", "-".repeat(50));
        for month in &report.monthly {
            println!(
                "  {:<8} | R$ {:>13.2} | {:>10.2} | {:>6}",
                month.period(),
                month.revenue.round_dp(2),
                month.quantity,
                month.sales
            );
        }
    }

    fn print_extremes(report: &ForecastReport) {
        let s = &report.summary;
        Self::header("PRICE EXTREMES");
        println!(
            "  Highest:  {}  on {}",
            brl(s.highest_price.price),
            s.highest_price.date.format("%d/%m/%Y")
        );
        println!(
            "  Lowest:   {}  on {}",
            brl(s.lowest_price.price),
            s.lowest_price.date.format("%d/%m/%Y")
        );
    }

    fn print_forecasts(report: &ForecastReport) {
        Self::header("NEXT PRICE FORECAST");
        println!(
            "  Window {} | {} training windows | scaling range {} .. {}",
            report.window_size,
            report.training_samples,
            brl(report.price_min),
            brl(report.price_max)
        );
        println!();
        for entry in &report.models {
            println!(
                "  {:<18} next {:>14}   in-sample RMSE {:>12}",
                entry.label,
                brl(entry.next_price),
                brl(entry.in_sample_rmse)
            );
        }
    }

    fn print_comparison(report: &ForecastReport) {
        Self::header("MODEL COMPARISON (in-sample RMSE, lower is better)");
        for (rank, entry) in report.ranking().iter().enumerate() {
            let marker = if Some(entry.model) == report.best_model {
                "  <- best"
            } else {
                ""
            };
            println!(
                "  {}. {:<18} {:>12}{}",
                rank + 1,
                entry.label,
                brl(entry.in_sample_rmse),
                marker
            );
        }
        println!("\n  RMSE is measured on the training windows; it is not a holdout score.");
    }
}

fn brl(value: f64) -> String {
    format!("R$ {:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::forecasting::{ForecastEngine, TrainingSettings};
    use crate::domain::analytics::monthly_revenue;
    use crate::domain::sales::{PriceSeries, SaleRecord};
    use chrono::NaiveDate;

    fn sample_report() -> ForecastReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<SaleRecord> = (0..16)
            .map(|i| {
                SaleRecord::new(
                    start + chrono::Days::new(i * 9),
                    120.0 + (i as f64 * 0.9).cos() * 6.0,
                    2.0,
                )
            })
            .collect();
        let settings = TrainingSettings {
            lstm_units: 4,
            mlp_layers: vec![4],
            epochs: 2,
            ..TrainingSettings::default()
        }
        .with_seed(8)
        .with_window_size(4);

        let series = PriceSeries::from_records(&records);
        let bundle = ForecastEngine::new(settings).initialize(series.prices()).unwrap();
        ForecastReport::new(
            SalesSummary::from_records(&records).unwrap(),
            monthly_revenue(&records),
            &bundle,
        )
    }

    #[test]
    fn test_brl_formatting() {
        assert_eq!(brl(1234.5), "R$ 1234.50");
        assert_eq!(brl(0.004), "R$ 0.00");
    }

    #[test]
    fn test_report_lists_every_model() {
        let report = sample_report();

        assert_eq!(report.models.len(), 3);
        assert_eq!(report.training_samples, 12);
        assert!(report.best_model.is_some());
        assert_eq!(report.ranking()[0].model, report.best_model.unwrap());
    }

    #[test]
    fn test_json_structure() {
        let report = sample_report();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["models"].as_array().unwrap().len(), 3);
        assert_eq!(value["models"][0]["model"], "recurrent");
        assert_eq!(value["window_size"], 4);
        assert!(value["summary"]["total_revenue"].is_string());
        assert!(value["summary"]["gross_sales_value"].is_string());
    }

    #[test]
    fn test_save_json_writes_timestamped_file() {
        let report = sample_report();
        let dir = std::env::temp_dir().join(format!("cotton_report_{}", std::process::id()));

        let path = ForecastReporter::save_json(&report, &dir).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("forecast_report_"));
        assert!(name.ends_with(".json"));

        let content = fs::read_to_string(&path).unwrap();
        let parsed: ForecastReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.models.len(), 3);

        fs::remove_dir_all(&dir).unwrap();
    }
}
