use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::types::{Dataset, MonthKey, Report};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub months: usize,
    pub years: usize,
    pub first: Option<MonthKey>,
    pub last: Option<MonthKey>,
    pub saldo_gaps: usize,
}

pub fn load_report<P: AsRef<Path>>(path: P) -> Result<(Report, LoadReport)> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let (report, load_report) = parse_report(&raw)?;
    info!(
        "loaded {} months ({} years) from {}",
        load_report.months,
        load_report.years,
        path.display()
    );
    Ok((report, load_report))
}

pub fn parse_report(raw: &str) -> Result<(Report, LoadReport)> {
    let report: Report = serde_json::from_str(raw)?;
    let load_report = inspect(&report.data);
    Ok((report, load_report))
}

/// Counts months where the closing saldo does not carry into the next
/// calendar month's opening saldo. Months with a gap between them are not
/// compared.
fn saldo_gaps(data: &Dataset) -> usize {
    let mut gaps = 0usize;
    let mut prev: Option<(&MonthKey, _)> = None;
    for (key, record) in data {
        if let Some((prev_key, prev_end)) = prev {
            if prev_key.next() == *key {
                if let (Some(end), Some(start)) = (prev_end, record.summary.start_saldo) {
                    if end != start {
                        warn!(
                            "saldo mismatch: {} closes at {} but {} opens at {}",
                            prev_key, end, key, start
                        );
                        gaps += 1;
                    }
                }
            }
        }
        prev = Some((key, record.summary.end_saldo));
    }
    gaps
}

fn inspect(data: &Dataset) -> LoadReport {
    let mut years: Vec<i32> = data.keys().map(|k| k.year).collect();
    years.dedup();
    LoadReport {
        months: data.len(),
        years: years.len(),
        first: data.keys().next().copied(),
        last: data.keys().next_back().copied(),
        saldo_gaps: saldo_gaps(data),
    }
}
