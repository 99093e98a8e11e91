use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::errors::DataError;
use crate::domain::ports::SalesDataSource;
use crate::domain::sales::SaleRecord;

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// One CSV row. Both the English and the Portuguese export headers are accepted.
#[derive(Debug, Deserialize)]
struct SaleRow {
    #[serde(alias = "Data")]
    date: String,
    #[serde(alias = "Preco_R$")]
    price: f64,
    /// Exports without a quantity column count each row as one unit
    #[serde(default, alias = "Quantidade")]
    quantity: Option<f64>,
}

/// Sales history stored as a headed CSV file.
pub struct CsvSalesSource {
    path: PathBuf,
}

impl CsvSalesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses CSV content from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<SaleRecord>, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (idx, result) in rdr.deserialize::<SaleRow>().enumerate() {
            let row = result?;
            let date = parse_date(&row.date).ok_or_else(|| DataError::InvalidDate {
                row: idx + 1,
                value: row.date.clone(),
            })?;
            records.push(SaleRecord::new(date, row.price, row.quantity.unwrap_or(1.0)));
        }
        Ok(records)
    }
}

impl SalesDataSource for CsvSalesSource {
    fn load(&self) -> Result<Vec<SaleRecord>, DataError> {
        let file = File::open(&self.path)?;
        let records = Self::from_reader(BufReader::new(file))?;

        if records.is_empty() {
            return Err(DataError::Empty {
                source_name: self.describe(),
            });
        }
        info!("Loaded {} sales from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
