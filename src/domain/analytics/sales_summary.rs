use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::domain::sales::SaleRecord;

/// A price observation pinned to the day it happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Headline figures over the whole sales history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Sum of unit prices over every sale, the dashboard's headline revenue
    pub total_revenue: Decimal,
    /// Sum of price x quantity
    pub gross_sales_value: Decimal,
    pub sale_count: usize,
    pub total_quantity: f64,
    pub highest_price: PricePoint,
    pub lowest_price: PricePoint,
    pub mean_price: f64,
    pub price_std_dev: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl SalesSummary {
    /// Returns `None` for an empty history.
    ///
    /// Ties on the extremes resolve to the earliest record.
    pub fn from_records(records: &[SaleRecord]) -> Option<Self> {
        let first = records.first()?;

        let mut highest = PricePoint {
            date: first.date,
            price: first.price,
        };
        let mut lowest = highest;
        let mut first_date = first.date;
        let mut last_date = first.date;

        for record in &records[1..] {
            if record.price > highest.price {
                highest = PricePoint {
                    date: record.date,
                    price: record.price,
                };
            }
            if record.price < lowest.price {
                lowest = PricePoint {
                    date: record.date,
                    price: record.price,
                };
            }
            first_date = first_date.min(record.date);
            last_date = last_date.max(record.date);
        }

        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();

        Some(Self {
            total_revenue: records.iter().map(SaleRecord::price_decimal).sum(),
            gross_sales_value: records.iter().map(SaleRecord::gross_value).sum(),
            sale_count: records.len(),
            total_quantity: records.iter().map(|r| r.quantity).sum(),
            highest_price: highest,
            lowest_price: lowest,
            mean_price: prices.iter().mean(),
            price_std_dev: prices.iter().population_std_dev(),
            first_date,
            last_date,
        })
    }
}
