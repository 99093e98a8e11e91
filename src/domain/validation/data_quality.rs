use crate::domain::sales::SaleRecord;
use tracing::warn;

/// Centralized validator for sales record integrity.
///
/// Rejects records whose price or quantity cannot be meaningful (NaN,
/// infinite, negative). Ordering is reported, never repaired.
pub struct SalesValidator;

impl SalesValidator {
    /// Validates a single record. Returns true if valid, false otherwise.
    pub fn validate_record(record: &SaleRecord) -> bool {
        if !record.price.is_finite() || record.price < 0.0 {
            warn!(
                "Validation FAILED: sale on {} has invalid price: {}",
                record.date, record.price
            );
            return false;
        }

        if !record.quantity.is_finite() || record.quantity < 0.0 {
            warn!(
                "Validation FAILED: sale on {} has invalid quantity: {}",
                record.date, record.quantity
            );
            return false;
        }

        true
    }

    /// Keeps only the valid records, preserving order.
    pub fn filter(records: Vec<SaleRecord>) -> Vec<SaleRecord> {
        let before = records.len();
        let kept: Vec<SaleRecord> = records
            .into_iter()
            .filter(Self::validate_record)
            .collect();

        if kept.len() < before {
            warn!(
                "Dropped {} invalid sales record(s), {} remain",
                before - kept.len(),
                kept.len()
            );
        }
        kept
    }

    /// True when dates never decrease. Same-day sales are allowed.
    pub fn is_chronological(records: &[SaleRecord]) -> bool {
        records.windows(2).all(|pair| pair[0].date <= pair[1].date)
    }
}
