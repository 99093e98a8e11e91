use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// A single cotton sale: price in R$ per unit and the quantity sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub quantity: f64,
}

impl SaleRecord {
    pub fn new(date: NaiveDate, price: f64, quantity: f64) -> Self {
        Self {
            date,
            price,
            quantity,
        }
    }

    /// Unit price as a Decimal, zero when not representable.
    pub fn price_decimal(&self) -> Decimal {
        Decimal::from_f64(self.price).unwrap_or(Decimal::ZERO)
    }

    /// Gross value of this sale (price x quantity).
    ///
    /// Falls back to zero when the product is not representable as a Decimal.
    pub fn gross_value(&self) -> Decimal {
        Decimal::from_f64(self.price * self.quantity).unwrap_or(Decimal::ZERO)
    }
}

/// Chronological (date, price) pairs fed to the forecasting models.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Builds the series in input order. Ordering is the data source's job.
    pub fn from_records(records: &[SaleRecord]) -> Self {
        Self {
            dates: records.iter().map(|r| r.date).collect(),
            prices: records.iter().map(|r| r.price).collect(),
        }
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}
