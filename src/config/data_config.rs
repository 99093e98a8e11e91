//! Input and output locations from environment variables.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/algodao.csv";

#[derive(Debug, Clone)]
pub struct DataEnvConfig {
    pub data_path: PathBuf,
    /// JSON reports are only written when this is set
    pub report_dir: Option<PathBuf>,
}

impl DataEnvConfig {
    pub fn from_env() -> Self {
        Self {
            data_path: env::var("SALES_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
            report_dir: env::var("REPORT_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
