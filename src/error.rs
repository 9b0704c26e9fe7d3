use thiserror::Error;

use crate::types::MonthKey;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid month key: {0} (expected YYYY-MM)")]
    InvalidMonthKey(String),
    #[error("year {0} is not present in the dataset")]
    UnknownYear(i32),
    #[error("month {0} is not present in the dataset")]
    UnknownMonth(MonthKey),
}

pub type Result<T> = std::result::Result<T, ReportError>;
