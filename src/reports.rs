use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tabled::builder::Builder;
use tabled::Table;

use crate::error::{ReportError, Result};
use crate::index::YearIndex;
use crate::series::unique_label;
use crate::translations::Translator;
use crate::types::{Dataset, DescribedEntry, MonthKey, MonthRecord, SummaryField};
use crate::util::{format_amount, month_name};

/// Highlight hint for a rendered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Positive,
    Negative,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub tone: Tone,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Cell {
        Cell { text: text.into(), tone: Tone::Plain }
    }
}

/// A rendered table: caption, header labels and text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub caption: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableModel {
    pub fn to_table(&self) -> Table {
        let mut builder = Builder::default();
        builder.push_record(self.header.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().map(|c| c.text.clone()));
        }
        builder.build()
    }
}

fn sign_tone(v: Decimal) -> Tone {
    if v > Decimal::ZERO {
        Tone::Positive
    } else if v < Decimal::ZERO {
        Tone::Negative
    } else {
        Tone::Plain
    }
}

fn record<'a>(data: &'a Dataset, key: MonthKey) -> Result<&'a MonthRecord> {
    data.get(&key).ok_or(ReportError::UnknownMonth(key))
}

/// One row per recorded month of `year`, one column per summary key seen
/// in that year: known fields first, then any extra keys.
pub fn generate_year_summary(
    data: &Dataset,
    index: &YearIndex,
    year: i32,
    t: &Translator,
    currency: &str,
) -> Result<TableModel> {
    let keys = index.month_keys(year)?;
    let records = keys
        .iter()
        .map(|k| record(data, *k).map(|r| (*k, r)))
        .collect::<Result<Vec<_>>>()?;

    let extra: BTreeSet<&str> = records
        .iter()
        .flat_map(|(_, r)| r.summary.extra.keys().map(String::as_str))
        .collect();
    let columns: Vec<&str> = SummaryField::ALL
        .iter()
        .filter(|f| records.iter().any(|(_, r)| r.summary.get(**f).is_some()))
        .map(|f| f.key())
        .chain(extra)
        .collect();

    let mut header = vec!["Miesiąc".to_string()];
    for key in &columns {
        unique_label(&mut header, t.resolve(key), key);
    }

    let rows = records
        .iter()
        .map(|(key, r)| {
            let mut row = vec![Cell::plain(month_name(key.month))];
            for key in &columns {
                let signed = SummaryField::from_key(key).map_or(false, |f| f.is_signed_delta());
                row.push(match r.summary.value_of(key) {
                    Some(v) => Cell {
                        text: format_amount(v, currency),
                        tone: if signed { sign_tone(v) } else { Tone::Plain },
                    },
                    None => Cell::plain("-"),
                });
            }
            row
        })
        .collect();

    Ok(TableModel {
        caption: format!("Podsumowanie roku {}", year),
        header,
        rows,
    })
}

fn category_table(
    caption: String,
    amounts: &BTreeMap<String, Decimal>,
    negate: bool,
    t: &Translator,
    currency: &str,
) -> TableModel {
    let sign = |v: Decimal| if negate { -v } else { v };
    let mut header: Vec<String> = Vec::new();
    for k in amounts.keys() {
        unique_label(&mut header, t.resolve(k), k);
    }
    unique_label(&mut header, "Suma", "total");

    let mut row: Vec<Cell> = amounts
        .values()
        .map(|v| Cell {
            text: format_amount(sign(*v), currency),
            tone: if v.is_zero() { Tone::Muted } else { Tone::Plain },
        })
        .collect();
    let total: Decimal = amounts.values().copied().sum();
    row.push(Cell::plain(format_amount(sign(total), currency)));

    TableModel { caption, header, rows: vec![row] }
}

/// Cost categories of one month, shown as positive spend.
pub fn generate_costs_table(
    data: &Dataset,
    key: MonthKey,
    t: &Translator,
    currency: &str,
) -> Result<TableModel> {
    let r = record(data, key)?;
    Ok(category_table(
        format!("Wydatki na miesiąc {}", month_name(key.month)),
        &r.costs,
        true,
        t,
        currency,
    ))
}

pub fn generate_income_table(
    data: &Dataset,
    key: MonthKey,
    t: &Translator,
    currency: &str,
) -> Result<TableModel> {
    let r = record(data, key)?;
    Ok(category_table(
        format!("Wpływy na miesiąc {}", month_name(key.month)),
        &r.income,
        false,
        t,
        currency,
    ))
}

/// Itemised lines, or `None` when the month has none.
pub fn generate_described_table(
    caption: &str,
    entries: &[DescribedEntry],
    t: &Translator,
    currency: &str,
) -> Option<TableModel> {
    if entries.is_empty() {
        return None;
    }
    let header = ["Kategoria", "Nazwa", "Szczegóły", "Kwota"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = entries
        .iter()
        .map(|e| {
            vec![
                Cell::plain(t.resolve(&e.category)),
                Cell::plain(e.name.clone().unwrap_or_default()),
                Cell::plain(e.details.clone().unwrap_or_default()),
                Cell {
                    text: format_amount(e.value, currency),
                    tone: sign_tone(e.value),
                },
            ]
        })
        .collect();
    Some(TableModel {
        caption: caption.to_string(),
        header,
        rows,
    })
}
