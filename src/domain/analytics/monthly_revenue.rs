use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::sales::SaleRecord;

/// Gross sales value (price x quantity) aggregated over one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: Decimal,
    pub quantity: f64,
    pub sales: usize,
}

impl MonthlyRevenue {
    /// `YYYY-MM` label
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Groups sales by calendar month, oldest month first, regardless of input order.
pub fn monthly_revenue(records: &[SaleRecord]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), MonthlyRevenue> = BTreeMap::new();

    for record in records {
        let key = (record.date.year(), record.date.month());
        let entry = months.entry(key).or_insert_with(|| MonthlyRevenue {
            year: key.0,
            month: key.1,
            revenue: Decimal::ZERO,
            quantity: 0.0,
            sales: 0,
        });
        entry.revenue += record.gross_value();
        entry.quantity += record.quantity;
        entry.sales += 1;
    }

    months.into_values().collect()
}
