use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ReportError;
use crate::util::de_count;

/// Raw category key to display label, supplied alongside the dataset.
pub type Legend = BTreeMap<String, String>;

/// Every month of the artifact, ordered chronologically by its key.
pub type Dataset = BTreeMap<MonthKey, MonthRecord>;

/// A `YYYY-MM` month identifier. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> MonthKey {
        MonthKey { year, month }
    }

    /// The calendar month immediately after this one.
    pub fn next(self) -> MonthKey {
        if self.month == 12 {
            MonthKey::new(self.year + 1, 1)
        } else {
            MonthKey::new(self.year, self.month + 1)
        }
    }
}

impl FromStr for MonthKey {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReportError::InvalidMonthKey(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(MonthKey { year, month })
    }
}

impl TryFrom<String> for MonthKey {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> String {
        key.to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Top-level JSON document: `{ data, legend, stats }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Report {
    pub data: Dataset,
    #[serde(default)]
    pub legend: Legend,
    #[serde(default)]
    pub stats: Option<Stats>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonthRecord {
    #[serde(default)]
    pub income: BTreeMap<String, Decimal>,
    #[serde(default, alias = "koszty")]
    pub costs: BTreeMap<String, Decimal>,
    #[serde(default, alias = "incomeDescribed")]
    pub income_described: Vec<DescribedEntry>,
    #[serde(default, alias = "koszty_described", alias = "costsDescribed")]
    pub costs_described: Vec<DescribedEntry>,
    #[serde(default)]
    pub summary: MonthSummary,
}

impl MonthRecord {
    pub fn income_total(&self) -> Decimal {
        self.income.values().copied().sum()
    }

    /// Signed sum of the cost categories, as stored (normally non-positive).
    pub fn cost_total(&self) -> Decimal {
        self.costs.values().copied().sum()
    }
}

/// Aggregates for one month. The first five fields come from the first
/// schema, the rest were added later for charting; any may be absent.
/// Numeric keys outside the known set are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MonthSummary {
    pub bilans: Option<Decimal>,
    pub start_saldo: Option<Decimal>,
    pub end_saldo: Option<Decimal>,
    pub safe_threshold: Option<Decimal>,
    pub safe_threshold_difference: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub costs: Option<Decimal>,
    pub incomes: Option<Decimal>,
    pub other_expenses: Option<Decimal>,
    pub venue_expenses: Option<Decimal>,
    pub date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryField {
    Balance,
    Bilans,
    Costs,
    EndSaldo,
    Incomes,
    OtherExpenses,
    SafeThreshold,
    SafeThresholdDifference,
    StartSaldo,
    VenueExpenses,
}

impl SummaryField {
    pub const ALL: [SummaryField; 10] = [
        SummaryField::Balance,
        SummaryField::Bilans,
        SummaryField::Costs,
        SummaryField::EndSaldo,
        SummaryField::Incomes,
        SummaryField::OtherExpenses,
        SummaryField::SafeThreshold,
        SummaryField::SafeThresholdDifference,
        SummaryField::StartSaldo,
        SummaryField::VenueExpenses,
    ];

    /// The raw key used in the JSON artifact.
    pub fn key(self) -> &'static str {
        match self {
            SummaryField::Balance => "balance",
            SummaryField::Bilans => "bilans",
            SummaryField::Costs => "costs",
            SummaryField::EndSaldo => "end_saldo",
            SummaryField::Incomes => "incomes",
            SummaryField::OtherExpenses => "other_expenses",
            SummaryField::SafeThreshold => "safe_threshold",
            SummaryField::SafeThresholdDifference => "safe_threshold_difference",
            SummaryField::StartSaldo => "start_saldo",
            SummaryField::VenueExpenses => "venue_expenses",
        }
    }

    pub fn from_key(key: &str) -> Option<SummaryField> {
        SummaryField::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Fields whose sign is worth highlighting in tables.
    pub fn is_signed_delta(self) -> bool {
        matches!(self, SummaryField::Bilans | SummaryField::SafeThresholdDifference)
    }
}

impl MonthSummary {
    pub fn get(&self, field: SummaryField) -> Option<Decimal> {
        match field {
            SummaryField::Balance => self.balance,
            SummaryField::Bilans => self.bilans,
            SummaryField::Costs => self.costs,
            SummaryField::EndSaldo => self.end_saldo,
            SummaryField::Incomes => self.incomes,
            SummaryField::OtherExpenses => self.other_expenses,
            SummaryField::SafeThreshold => self.safe_threshold,
            SummaryField::SafeThresholdDifference => self.safe_threshold_difference,
            SummaryField::StartSaldo => self.start_saldo,
            SummaryField::VenueExpenses => self.venue_expenses,
        }
    }

    /// Present numeric fields, in key order.
    pub fn fields(&self) -> Vec<(SummaryField, Decimal)> {
        SummaryField::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| (*f, v)))
            .collect()
    }

    /// Every numeric entry by raw key: known fields in key order, then the
    /// extra keys in sorted order.
    pub fn entries(&self) -> Vec<(&str, Decimal)> {
        let mut out: Vec<(&str, Decimal)> =
            self.fields().into_iter().map(|(f, v)| (f.key(), v)).collect();
        out.extend(self.extra.iter().map(|(k, v)| (k.as_str(), *v)));
        out
    }

    pub fn value_of(&self, key: &str) -> Option<Decimal> {
        match SummaryField::from_key(key) {
            Some(field) => self.get(field),
            None => self.extra.get(key).copied(),
        }
    }
}

/// An itemised income or cost line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "RawDescribed")]
pub struct DescribedEntry {
    pub value: Decimal,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// Older artifacts nest category and metadata under `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDescribed {
    Nested {
        value: Decimal,
        data: NestedDescription,
    },
    Flat {
        value: Decimal,
        category: String,
        #[serde(default)]
        details: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Deserialize)]
struct NestedDescription {
    category: String,
    #[serde(default)]
    metadata: Option<NestedMetadata>,
}

#[derive(Deserialize)]
struct NestedMetadata {
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<RawDescribed> for DescribedEntry {
    fn from(raw: RawDescribed) -> Self {
        match raw {
            RawDescribed::Nested { value, data } => {
                let (details, name) = match data.metadata {
                    Some(m) => (m.details, m.name),
                    None => (None, None),
                };
                DescribedEntry { value, category: data.category, details, name }
            }
            RawDescribed::Flat { value, category, details, name } => {
                DescribedEntry { value, category, details, name }
            }
        }
    }
}

/// How the artifact was produced. Informational only.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Stats {
    #[serde(default)]
    pub parsing_date: Option<String>,
    #[serde(default)]
    pub operations: Option<Operations>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Operations {
    #[serde(default, deserialize_with = "de_count")]
    pub all: u64,
    #[serde(default)]
    pub months: BTreeMap<String, u64>,
}

/// Key of the month column in every serialized chart record.
pub const MONTH_COLUMN: &str = "month";

/// A summary entry under its display label. `key` is the raw summary key.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartValue {
    pub key: String,
    pub label: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartDate {
    pub label: String,
    pub value: String,
}

/// One month of summary data with display labels, ready for a chart.
///
/// Serializes as a flat object: `{"month": "2023-01", "<label>": "<value>", ...}`.
/// Labels within a record are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRecord {
    pub month: MonthKey,
    pub date: Option<ChartDate>,
    pub values: Vec<ChartValue>,
}

impl ChartRecord {
    pub fn value(&self, key: &str) -> Option<Decimal> {
        self.values.iter().find(|v| v.key == key).map(|v| v.value)
    }
}

impl Serialize for ChartRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.date.is_some());
        let mut map = serializer.serialize_map(Some(self.values.len() + 1 + extra))?;
        map.serialize_entry(MONTH_COLUMN, &self.month)?;
        if let Some(date) = &self.date {
            map.serialize_entry(&date.label, &date.value)?;
        }
        for v in &self.values {
            map.serialize_entry(&v.label, &v.value)?;
        }
        map.end()
    }
}

/// A pie-chart slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartItem {
    pub name: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub income: Vec<ChartItem>,
    pub cost: Vec<ChartItem>,
}

/// Stacked venue/other/income bars with saldo and monthly sum lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub month: MonthKey,
    pub venue_expenses: Decimal,
    pub incomes: Decimal,
    pub other_expenses: Decimal,
    pub saldo: Decimal,
    pub monthly_sum: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn month_key_parses_and_orders() {
        let a: MonthKey = "2022-12".parse().unwrap();
        let b: MonthKey = "2023-01".parse().unwrap();
        assert_eq!(a, MonthKey::new(2022, 12));
        assert!(a < b);
        assert_eq!(a.next(), b);
        assert_eq!(b.to_string(), "2023-01");
    }

    #[test]
    fn month_key_rejects_malformed() {
        for bad in ["2023-1", "2023-13", "2023-00", "23-01", "2023/01", "abcd-01", "2023-01-05"] {
            assert!(bad.parse::<MonthKey>().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn month_record_accepts_both_schemas() {
        let old = r#"{
            "income": {"darowizny_celowe": "100.00"},
            "koszty": {"bank": "-5.50"},
            "income_described": [],
            "koszty_described": [
                {"value": "-5.50", "data": {"category": "bank", "metadata": {"details": "fee", "name": "PKO"}}}
            ],
            "summary": {"bilans": "94.50", "end_saldo": "194.50", "start_saldo": "100"}
        }"#;
        let rec: MonthRecord = serde_json::from_str(old).unwrap();
        assert_eq!(rec.costs["bank"], dec!(-5.50));
        assert_eq!(rec.costs_described[0].name.as_deref(), Some("PKO"));
        assert_eq!(rec.costs_described[0].category, "bank");
        assert_eq!(rec.summary.bilans, Some(dec!(94.50)));

        let new = r#"{
            "income": {},
            "costs": {"lokal": "-1200"},
            "incomeDescribed": [{"value": 50, "category": "event", "name": "Meetup"}],
            "costsDescribed": [],
            "summary": {"incomes": "50", "venue_expenses": "-1200", "date": "2023-02-01"}
        }"#;
        let rec: MonthRecord = serde_json::from_str(new).unwrap();
        assert_eq!(rec.income_described[0].value, dec!(50));
        assert_eq!(rec.income_described[0].details, None);
        assert_eq!(rec.summary.date.as_deref(), Some("2023-02-01"));
        assert!(rec.summary.extra.is_empty());
        assert_eq!(rec.cost_total(), dec!(-1200));
    }

    #[test]
    fn summary_fields_skip_absent_values() {
        let s = MonthSummary {
            end_saldo: Some(dec!(10)),
            start_saldo: Some(dec!(5)),
            ..Default::default()
        };
        let fields = s.fields();
        assert_eq!(
            fields,
            vec![(SummaryField::EndSaldo, dec!(10)), (SummaryField::StartSaldo, dec!(5))]
        );
    }

    #[test]
    fn summary_keeps_unknown_numeric_keys() {
        let s: MonthSummary = serde_json::from_str(
            r#"{"end_saldo": "1", "date": "2023-01-31", "extra_field": "5"}"#,
        )
        .unwrap();
        assert_eq!(s.end_saldo, Some(dec!(1)));
        assert_eq!(s.date.as_deref(), Some("2023-01-31"));
        assert_eq!(s.extra.get("extra_field"), Some(&dec!(5)));
        assert_eq!(s.entries(), vec![("end_saldo", dec!(1)), ("extra_field", dec!(5))]);
        assert_eq!(s.value_of("extra_field"), Some(dec!(5)));
        assert_eq!(s.value_of("end_saldo"), Some(dec!(1)));
        assert_eq!(s.value_of("missing"), None);
    }

    #[test]
    fn chart_record_serializes_flat() {
        let rec = ChartRecord {
            month: MonthKey::new(2023, 1),
            date: Some(ChartDate {
                label: "Data".to_string(),
                value: "2023-01-31".to_string(),
            }),
            values: vec![ChartValue {
                key: "end_saldo".to_string(),
                label: "Saldo końcowe".to_string(),
                value: dec!(12.50),
            }],
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["month"], "2023-01");
        assert_eq!(json["Data"], "2023-01-31");
        assert_eq!(json["Saldo końcowe"], "12.50");
        assert!(json.get("date").is_none());
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
