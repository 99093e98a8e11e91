pub mod csv_source;
pub mod in_memory;

pub use csv_source::CsvSalesSource;
pub use in_memory::InMemorySalesSource;
