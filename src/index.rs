use std::collections::BTreeMap;

use crate::error::{ReportError, Result};
use crate::types::{Dataset, MonthKey};

/// Year to recorded months, both ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearIndex {
    years: BTreeMap<i32, Vec<u32>>,
}

impl YearIndex {
    pub fn build(data: &Dataset) -> YearIndex {
        let mut years: BTreeMap<i32, Vec<u32>> = BTreeMap::new();
        // Dataset keys iterate chronologically, so each month list comes out sorted.
        for key in data.keys() {
            years.entry(key.year).or_default().push(key.month);
        }
        YearIndex { years }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Years present, most recent first.
    pub fn available_years(&self) -> Vec<i32> {
        self.years.keys().rev().copied().collect()
    }

    /// Years present, oldest first.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn months(&self, year: i32) -> Result<&[u32]> {
        self.years
            .get(&year)
            .map(Vec::as_slice)
            .ok_or(ReportError::UnknownYear(year))
    }

    pub fn month_keys(&self, year: i32) -> Result<Vec<MonthKey>> {
        Ok(self
            .months(year)?
            .iter()
            .map(|m| MonthKey::new(year, *m))
            .collect())
    }

    pub fn contains(&self, key: MonthKey) -> bool {
        self.years
            .get(&key.year)
            .map_or(false, |months| months.contains(&key.month))
    }

    pub fn month_count(&self) -> usize {
        self.years.values().map(Vec::len).sum()
    }
}

/// The year/month currently shown by a report view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub year: i32,
    pub month: u32,
}

impl Selection {
    /// Most recent year, first recorded month of that year.
    pub fn latest(index: &YearIndex) -> Option<Selection> {
        let year = *index.years.keys().next_back()?;
        let month = *index.years.get(&year)?.first()?;
        Some(Selection { year, month })
    }

    /// Switch year, keeping the month when the new year has it.
    pub fn with_year(self, index: &YearIndex, year: i32) -> Result<Selection> {
        let months = index.months(year)?;
        let month = if months.contains(&self.month) {
            self.month
        } else {
            *months.first().ok_or(ReportError::UnknownYear(year))?
        };
        Ok(Selection { year, month })
    }

    pub fn with_month(self, index: &YearIndex, month: u32) -> Result<Selection> {
        let key = MonthKey::new(self.year, month);
        if !index.contains(key) {
            return Err(ReportError::UnknownMonth(key));
        }
        Ok(Selection { year: self.year, month })
    }

    pub fn key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonthRecord;

    fn dataset(keys: &[&str]) -> Dataset {
        keys.iter()
            .map(|k| (k.parse().unwrap(), MonthRecord::default()))
            .collect()
    }

    #[test]
    fn years_descending_months_ascending() {
        let data = dataset(&["2023-03", "2022-05", "2023-01", "2022-11"]);
        let index = YearIndex::build(&data);
        assert_eq!(index.available_years(), vec![2023, 2022]);
        assert_eq!(index.months(2023).unwrap(), &[1, 3]);
        assert_eq!(index.months(2022).unwrap(), &[5, 11]);
        assert_eq!(index.month_count(), 4);
    }

    #[test]
    fn single_month_dataset() {
        let index = YearIndex::build(&dataset(&["2021-07"]));
        assert_eq!(index.available_years(), vec![2021]);
        assert_eq!(index.months(2021).unwrap(), &[7]);
        assert_eq!(Selection::latest(&index), Some(Selection { year: 2021, month: 7 }));
    }

    #[test]
    fn unknown_year_fails() {
        let index = YearIndex::build(&dataset(&["2021-07"]));
        assert!(matches!(index.months(2019), Err(ReportError::UnknownYear(2019))));
    }

    #[test]
    fn empty_dataset_has_no_selection() {
        let index = YearIndex::build(&Dataset::new());
        assert!(index.is_empty());
        assert!(index.available_years().is_empty());
        assert_eq!(Selection::latest(&index), None);
    }

    #[test]
    fn switching_year_keeps_month_when_present() {
        let index = YearIndex::build(&dataset(&["2022-03", "2022-04", "2023-01", "2023-04"]));
        let sel = Selection::latest(&index).unwrap();
        assert_eq!(sel, Selection { year: 2023, month: 1 });

        let sel = sel.with_month(&index, 4).unwrap();
        let sel = sel.with_year(&index, 2022).unwrap();
        assert_eq!(sel, Selection { year: 2022, month: 4 });

        let sel = sel.with_month(&index, 3).unwrap().with_year(&index, 2023).unwrap();
        assert_eq!(sel, Selection { year: 2023, month: 1 });
    }

    #[test]
    fn selecting_missing_month_fails() {
        let index = YearIndex::build(&dataset(&["2023-01"]));
        let sel = Selection::latest(&index).unwrap();
        assert!(matches!(
            sel.with_month(&index, 2),
            Err(ReportError::UnknownMonth(k)) if k == MonthKey::new(2023, 2)
        ));
    }
}
