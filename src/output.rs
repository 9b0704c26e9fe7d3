use std::path::Path;

use serde::Serialize;
use tabled::settings::Style;

use crate::error::Result;
use crate::reports::TableModel;
use crate::series::unique_label;
use crate::types::{ChartRecord, MONTH_COLUMN};

enum Column {
    Date,
    Value(String),
}

/// Column union over all records in first-seen order: the date column when
/// any month has one, then one column per raw summary key. Header labels are
/// made unique so two keys sharing a label keep separate columns.
fn series_columns(records: &[ChartRecord]) -> Vec<(Column, String)> {
    let mut used = vec![MONTH_COLUMN.to_string()];
    let mut columns: Vec<(Column, String)> = Vec::new();
    if let Some(date) = records.iter().find_map(|r| r.date.as_ref()) {
        columns.push((Column::Date, unique_label(&mut used, &date.label, "date")));
    }
    let mut seen: Vec<&str> = Vec::new();
    for r in records {
        for v in &r.values {
            if !seen.contains(&v.key.as_str()) {
                seen.push(&v.key);
                let label = unique_label(&mut used, &v.label, &v.key);
                columns.push((Column::Value(v.key.clone()), label));
            }
        }
    }
    columns
}

/// Chart series as CSV. Fields missing from a month are left empty.
pub fn write_series_csv<P: AsRef<Path>>(path: P, records: &[ChartRecord]) -> Result<()> {
    let columns = series_columns(records);
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![MONTH_COLUMN.to_string()];
    header.extend(columns.iter().map(|(_, label)| label.clone()));
    wtr.write_record(&header)?;
    for r in records {
        let mut row = vec![r.month.to_string()];
        for (col, _) in &columns {
            let cell = match col {
                Column::Date => r.date.as_ref().map(|d| d.value.clone()),
                Column::Value(key) => r.value(key).map(|v| v.to_string()),
            };
            row.push(cell.unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table(model: &TableModel) -> String {
    model.to_table().with(Style::markdown()).to_string()
}

pub fn preview_table(model: &TableModel) {
    println!("{}\n", model.caption);
    if model.rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    println!("{}\n", render_table(model));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartDate, ChartValue, MonthKey};
    use rust_decimal_macros::dec;

    fn rec(month: u32, values: Vec<(&str, &str, rust_decimal::Decimal)>) -> ChartRecord {
        ChartRecord {
            month: MonthKey::new(2023, month),
            date: None,
            values: values
                .into_iter()
                .map(|(key, label, value)| ChartValue {
                    key: key.to_string(),
                    label: label.to_string(),
                    value,
                })
                .collect(),
        }
    }

    fn written(name: &str, records: &[ChartRecord]) -> Vec<String> {
        let path = std::env::temp_dir().join(format!("finreport-{}-{}.csv", name, std::process::id()));
        write_series_csv(&path, records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn series_csv_fills_missing_columns() {
        let records = vec![
            rec(1, vec![("end_saldo", "Saldo", dec!(10.5))]),
            rec(2, vec![("incomes", "Wpływy", dec!(3))]),
        ];
        assert_eq!(
            written("missing", &records),
            vec!["month,Saldo,Wpływy", "2023-01,10.5,", "2023-02,,3"]
        );
    }

    #[test]
    fn series_csv_has_translated_date_column() {
        let mut first = rec(1, vec![("end_saldo", "Saldo", dec!(1))]);
        first.date = Some(ChartDate { label: "Data".to_string(), value: "2023-01-31".to_string() });
        let second = rec(2, vec![("end_saldo", "Saldo", dec!(2))]);
        assert_eq!(
            written("date", &[first, second]),
            vec!["month,Data,Saldo", "2023-01,2023-01-31,1", "2023-02,,2"]
        );
    }

    #[test]
    fn series_csv_keeps_same_label_keys_apart() {
        let records = vec![
            rec(1, vec![("end_saldo", "Saldo", dec!(7))]),
            rec(2, vec![("start_saldo", "Saldo", dec!(8))]),
        ];
        assert_eq!(
            written("collide", &records),
            vec!["month,Saldo,Saldo (start_saldo)", "2023-01,7,", "2023-02,,8"]
        );
    }

    #[test]
    fn json_round_trips_to_disk() {
        let path = std::env::temp_dir().join(format!("finreport-{}.json", std::process::id()));
        let records = vec![rec(3, vec![("bilans", "Bilans", dec!(-7))])];
        write_json(&path, &records).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(v[0]["Bilans"], "-7");
        assert_eq!(v[0]["month"], "2023-03");
    }

    #[test]
    fn markdown_render_contains_header() {
        let model = TableModel {
            caption: "c".to_string(),
            header: vec!["A".to_string()],
            rows: vec![],
        };
        assert!(render_table(&model).contains('A'));
    }
}
