// Sales history aggregates
pub mod monthly_revenue;
pub mod sales_summary;

pub use monthly_revenue::{MonthlyRevenue, monthly_revenue};
pub use sales_summary::{PricePoint, SalesSummary};
