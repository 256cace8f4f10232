//! Immutable date to feature-vector lookup

use crate::features::FeatureVector;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Feature vectors keyed by date. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastIndex {
    entries: BTreeMap<NaiveDate, FeatureVector>,
}

impl ForecastIndex {
    /// Take ownership of a feature map
    pub fn build(features: BTreeMap<NaiveDate, FeatureVector>) -> Self {
        Self { entries: features }
    }

    /// Earliest indexed date
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.entries.keys().next().copied()
    }

    /// Latest indexed date
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.entries.keys().next_back().copied()
    }

    /// Earliest and latest indexed dates
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.min_date().zip(self.max_date())
    }

    /// Exact key presence; a dropped date inside the range is absent
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&date)
    }

    /// Feature vector of a date
    pub fn get(&self, date: NaiveDate) -> Option<&FeatureVector> {
        self.entries.get(&date)
    }

    /// Indexed dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.keys().copied()
    }

    /// Entries in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &FeatureVector)> {
        self.entries.iter()
    }

    /// Number of indexed dates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(marker: f64) -> FeatureVector {
        FeatureVector {
            pm10: marker,
            no2: 0.0,
            co: 0.0,
            nh3: 0.0,
            temp_c: 0.0,
            humidity: 0.0,
            wind_m_s: 0.0,
            precip_mm: 0.0,
            press_hpa: 0.0,
            day_of_year: 1,
            month: 1,
            weekday: 0,
            pm25_lag1: 0.0,
            pm25_lag2: 0.0,
            pm25_lag3: 0.0,
            pm25_roll7: 0.0,
            pm25_roll14: 0.0,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, d).unwrap()
    }

    #[test]
    fn test_contains_is_exact_not_range() {
        let index = ForecastIndex::build(BTreeMap::from([
            (day(1), vector(1.0)),
            (day(2), vector(2.0)),
            (day(4), vector(4.0)),
        ]));

        assert_eq!(index.range(), Some((day(1), day(4))));
        assert!(index.contains(day(2)));
        assert!(!index.contains(day(3)));
        assert!(index.get(day(3)).is_none());
        assert_eq!(index.get(day(4)).map(|v| v.pm10), Some(4.0));
    }

    #[test]
    fn test_empty_index() {
        let index = ForecastIndex::default();

        assert!(index.is_empty());
        assert_eq!(index.min_date(), None);
        assert_eq!(index.max_date(), None);
        assert_eq!(index.range(), None);
        assert!(!index.contains(day(1)));
    }

    #[test]
    fn test_dates_ascending() {
        let index = ForecastIndex::build(BTreeMap::from([
            (day(9), vector(9.0)),
            (day(3), vector(3.0)),
        ]));

        assert_eq!(index.dates().collect::<Vec<_>>(), vec![day(3), day(9)]);
        assert_eq!(index.len(), 2);
    }
}
