use chrono::NaiveDate;
use cotton_forecast::domain::analytics::{SalesSummary, monthly_revenue};
use cotton_forecast::domain::ports::SalesDataSource;
use cotton_forecast::domain::sales::{PriceSeries, SaleRecord};
use cotton_forecast::domain::validation::SalesValidator;
use cotton_forecast::infrastructure::{CsvSalesSource, InMemorySalesSource};
use rust_decimal_macros::dec;
use std::io::Write;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const PORTUGUESE_CSV: &str = "\
Data,Preco_R$,Quantidade
15/01/2024,120.00,10
28/01/2024,125.50,4
03/02/2024,118.00,6
20/02/2024,131.25,2
";

#[test]
fn test_csv_file_with_portuguese_headers() {
    let path = std::env::temp_dir().join(format!("algodao_{}.csv", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(PORTUGUESE_CSV.as_bytes()).unwrap();

    let source = CsvSalesSource::new(&path);
    let records = source.load().unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].date, date(2024, 1, 15));
    assert_eq!(records[3].price, 131.25);
    assert!(source.describe().contains("algodao_"));
}

#[test]
fn test_english_headers_and_iso_dates_match_portuguese_export() {
    let english = "date,price,quantity\n2024-01-15,120.00,10\n2024-01-28,125.50,4\n\
                   2024-02-03,118.00,6\n2024-02-20,131.25,2\n";

    let a = CsvSalesSource::from_reader(english.as_bytes()).unwrap();
    let b = CsvSalesSource::from_reader(PORTUGUESE_CSV.as_bytes()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_summary_and_monthly_from_csv() {
    let records = CsvSalesSource::from_reader(PORTUGUESE_CSV.as_bytes()).unwrap();

    let summary = SalesSummary::from_records(&records).unwrap();
    // 120 + 125.5 + 118 + 131.25
    assert_eq!(summary.total_revenue, dec!(494.75));
    // 1200 + 502 + 708 + 262.5
    assert_eq!(summary.gross_sales_value, dec!(2672.5));
    assert_eq!(summary.sale_count, 4);
    assert_eq!(summary.highest_price.price, 131.25);
    assert_eq!(summary.highest_price.date, date(2024, 2, 20));
    assert_eq!(summary.lowest_price.date, date(2024, 2, 3));

    let monthly = monthly_revenue(&records);
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0].period(), "2024-01");
    assert_eq!(monthly[0].revenue, dec!(1702));
    assert_eq!(monthly[1].sales, 2);
    assert_eq!(monthly[1].quantity, 8.0);
}

#[test]
fn test_validator_drops_bad_rows_before_analytics() {
    let source = InMemorySalesSource::new(vec![
        SaleRecord::new(date(2024, 3, 1), 100.0, 1.0),
        SaleRecord::new(date(2024, 3, 2), f64::NAN, 1.0),
        SaleRecord::new(date(2024, 3, 3), 102.0, -5.0),
        SaleRecord::new(date(2024, 3, 4), 104.0, 2.0),
    ]);

    let records = SalesValidator::filter(source.load().unwrap());

    assert_eq!(records.len(), 2);
    assert!(SalesValidator::is_chronological(&records));
    assert_eq!(
        PriceSeries::from_records(&records).prices(),
        &[100.0, 104.0]
    );
}

#[test]
fn test_out_of_order_history_is_detected_not_reordered() {
    let records = vec![
        SaleRecord::new(date(2024, 5, 2), 10.0, 1.0),
        SaleRecord::new(date(2024, 5, 1), 11.0, 1.0),
    ];

    assert!(!SalesValidator::is_chronological(&records));
    let series = PriceSeries::from_records(&records);
    assert_eq!(series.prices(), &[10.0, 11.0]);
    assert_eq!(series.last_date(), Some(date(2024, 5, 1)));
}
