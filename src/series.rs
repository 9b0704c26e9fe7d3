// Chart-ready series built from the dataset.
//
// Every builder is pure over its inputs and emits months in chronological
// order.
use log::debug;
use rust_decimal::Decimal;

use crate::error::{ReportError, Result};
use crate::index::YearIndex;
use crate::translations::Translator;
use crate::types::{
    CategoryBreakdown, ChartDate, ChartItem, ChartRecord, ChartValue, Dataset, MonthKey,
    MonthRecord, MonthSummary, PlotPoint, MONTH_COLUMN,
};

/// Returns `label`, or `label (key)` when another entry already took it,
/// and records the result in `used`.
pub fn unique_label(used: &mut Vec<String>, label: &str, key: &str) -> String {
    let mut candidate = label.to_string();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = if n == 1 {
            format!("{} ({})", label, key)
        } else {
            format!("{} ({} {})", label, key, n)
        };
        n += 1;
    }
    used.push(candidate.clone());
    candidate
}

/// Rename every summary entry, the date included, to its display label.
pub fn project_summary(month: MonthKey, summary: &MonthSummary, t: &Translator) -> ChartRecord {
    let mut used = vec![MONTH_COLUMN.to_string()];
    let date = summary.date.as_ref().map(|value| ChartDate {
        label: unique_label(&mut used, t.resolve("date"), "date"),
        value: value.clone(),
    });
    let values = summary
        .entries()
        .into_iter()
        .map(|(key, value)| ChartValue {
            key: key.to_string(),
            label: unique_label(&mut used, t.resolve(key), key),
            value,
        })
        .collect();
    ChartRecord { month, date, values }
}

fn lookup(data: &Dataset, key: MonthKey) -> Result<&MonthRecord> {
    data.get(&key).ok_or(ReportError::UnknownMonth(key))
}

pub fn build_year_series(
    data: &Dataset,
    index: &YearIndex,
    year: i32,
    t: &Translator,
) -> Result<Vec<ChartRecord>> {
    let keys = index.month_keys(year)?;
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let record = lookup(data, key)?;
        out.push(project_summary(key, &record.summary, t));
    }
    debug!("built {} chart records for {}", out.len(), year);
    Ok(out)
}

/// All years concatenated, oldest first. Never truncated.
pub fn build_full_series(
    data: &Dataset,
    index: &YearIndex,
    t: &Translator,
) -> Result<Vec<ChartRecord>> {
    let mut out = Vec::with_capacity(index.month_count());
    for year in index.years() {
        out.extend(build_year_series(data, index, year, t)?);
    }
    Ok(out)
}

fn breakdown_items<'a>(
    amounts: impl Iterator<Item = (&'a String, &'a Decimal)>,
    t: &Translator,
) -> Vec<ChartItem> {
    amounts
        .filter(|(_, v)| !v.is_zero())
        .map(|(k, v)| ChartItem {
            name: t.resolve(k).to_string(),
            value: v.abs(),
        })
        .collect()
}

/// Pie slices for one month: absolute amounts, zero categories dropped.
pub fn build_category_breakdown(record: &MonthRecord, t: &Translator) -> CategoryBreakdown {
    CategoryBreakdown {
        income: breakdown_items(record.income.iter(), t),
        cost: breakdown_items(record.costs.iter(), t),
    }
}

/// Points for the venue/other/income stacked bars with saldo and monthly
/// sum lines. Months without the charting aggregates are skipped.
pub fn build_balance_plot(data: &Dataset, index: &YearIndex) -> Result<Vec<PlotPoint>> {
    let mut out = Vec::new();
    for year in index.years() {
        for key in index.month_keys(year)? {
            let s = &lookup(data, key)?.summary;
            let (Some(venue), Some(incomes), Some(others), Some(saldo)) =
                (s.venue_expenses, s.incomes, s.other_expenses, s.end_saldo)
            else {
                debug!("{} has no plot aggregates, skipping", key);
                continue;
            };
            out.push(PlotPoint {
                month: key,
                venue_expenses: venue,
                incomes,
                other_expenses: others,
                saldo,
                monthly_sum: venue + others + incomes,
            });
        }
    }
    Ok(out)
}
