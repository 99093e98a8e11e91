//! In-memory sales source for tests and embedding.

use crate::domain::errors::DataError;
use crate::domain::ports::SalesDataSource;
use crate::domain::sales::SaleRecord;

/// Serves a fixed list of records
pub struct InMemorySalesSource {
    records: Vec<SaleRecord>,
}

impl InMemorySalesSource {
    pub fn new(records: Vec<SaleRecord>) -> Self {
        Self { records }
    }
}

impl SalesDataSource for InMemorySalesSource {
    fn load(&self) -> Result<Vec<SaleRecord>, DataError> {
        if self.records.is_empty() {
            return Err(DataError::Empty {
                source_name: self.describe(),
            });
        }
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory source ({} records)", self.records.len())
    }
}
