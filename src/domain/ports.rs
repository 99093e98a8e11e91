use crate::domain::errors::DataError;
use crate::domain::sales::SaleRecord;

/// Supplies the raw sales history. Implementations decide where it lives.
pub trait SalesDataSource: Send + Sync {
    fn load(&self) -> Result<Vec<SaleRecord>, DataError>;

    /// Human-readable origin, used in logs
    fn describe(&self) -> String;
}
