//! Feature engineering over the sorted observation series
//!
//! Each eligible date gets a [`FeatureVector`] made of:
//!
//! - the raw predictor measurements of that day
//! - calendar fields: day of year (1-366), month (1-12), weekday (Monday = 0)
//! - the target value 1, 2 and 3 rows earlier
//! - the trailing 7- and 14-row means of the target, current row included
//!
//! Lags and windows count rows of the sorted series, not calendar days. If the
//! source skips a day, the row above is still "lag 1".
//!
//! A date is eligible only when every field above is defined. Rows that are
//! not are recorded in an [`ExclusionReport`] together with the fields they
//! lack; nothing is imputed.

use crate::data::{Measurements, ObservationStore};
use crate::error::Result;
use crate::schema::{
    FEATURE_COLUMNS, LAGS, LAG_FEATURES, RAW_PREDICTORS, ROLLING_FEATURES, ROLLING_WINDOWS,
    TARGET_COLUMN,
};
use aq_math::{lag, rolling_mean};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Model inputs for one date, every field defined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub pm10: f64,
    pub no2: f64,
    pub co: f64,
    pub nh3: f64,
    pub temp_c: f64,
    pub humidity: f64,
    pub wind_m_s: f64,
    pub precip_mm: f64,
    #[serde(rename = "press_hPa")]
    pub press_hpa: f64,
    #[serde(rename = "dayofyear")]
    pub day_of_year: u32,
    pub month: u32,
    pub weekday: u32,
    pub pm25_lag1: f64,
    pub pm25_lag2: f64,
    pub pm25_lag3: f64,
    pub pm25_roll7: f64,
    pub pm25_roll14: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_COLUMNS`] order, as the model expects them
    pub fn to_model_input(&self) -> [f64; FEATURE_COLUMNS.len()] {
        [
            self.pm10,
            self.no2,
            self.co,
            self.nh3,
            self.temp_c,
            self.humidity,
            self.wind_m_s,
            self.precip_mm,
            self.press_hpa,
            self.day_of_year as f64,
            self.month as f64,
            self.weekday as f64,
            self.pm25_lag1,
            self.pm25_lag2,
            self.pm25_lag3,
            self.pm25_roll7,
            self.pm25_roll14,
        ]
    }

    /// Look a feature up by its schema name
    pub fn value(&self, name: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|i| self.to_model_input()[i])
    }
}

/// Features of one row before the validity check
#[derive(Debug, Clone, Copy)]
struct CandidateRow {
    measurements: Measurements,
    date: NaiveDate,
    lags: [Option<f64>; LAGS.len()],
    rolling: [Option<f64>; ROLLING_WINDOWS.len()],
}

impl CandidateRow {
    /// Every feature the row lacks, by schema name
    fn missing_fields(&self) -> Vec<&'static str> {
        let raw = RAW_PREDICTORS
            .iter()
            .filter(|name| defined(self.measurements.value(name)).is_none());
        let lags = LAG_FEATURES
            .iter()
            .zip(self.lags)
            .filter(|(_, v)| defined(*v).is_none())
            .map(|(name, _)| name);
        let rolling = ROLLING_FEATURES
            .iter()
            .zip(self.rolling)
            .filter(|(_, v)| defined(*v).is_none())
            .map(|(name, _)| name);

        raw.chain(lags).chain(rolling).copied().collect()
    }

    fn validate(self) -> std::result::Result<FeatureVector, Vec<&'static str>> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(missing);
        }

        let m = &self.measurements;
        let (Some(pm10), Some(no2), Some(co), Some(nh3), Some(temp_c)) =
            (m.pm10, m.no2, m.co, m.nh3, m.temp_c)
        else {
            return Err(RAW_PREDICTORS[..5].to_vec());
        };
        let (Some(humidity), Some(wind_m_s), Some(precip_mm), Some(press_hpa)) =
            (m.humidity, m.wind_m_s, m.precip_mm, m.press_hpa)
        else {
            return Err(RAW_PREDICTORS[5..].to_vec());
        };
        let [Some(pm25_lag1), Some(pm25_lag2), Some(pm25_lag3)] = self.lags else {
            return Err(LAG_FEATURES.to_vec());
        };
        let [Some(pm25_roll7), Some(pm25_roll14)] = self.rolling else {
            return Err(ROLLING_FEATURES.to_vec());
        };

        Ok(FeatureVector {
            pm10,
            no2,
            co,
            nh3,
            temp_c,
            humidity,
            wind_m_s,
            precip_mm,
            press_hpa,
            day_of_year: self.date.ordinal(),
            month: self.date.month(),
            weekday: self.date.weekday().num_days_from_monday(),
            pm25_lag1,
            pm25_lag2,
            pm25_lag3,
            pm25_roll7,
            pm25_roll14,
        })
    }
}

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Dates left out of the feature set, with the fields each one lacks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionReport {
    excluded: BTreeMap<NaiveDate, Vec<&'static str>>,
}

impl ExclusionReport {
    /// Missing fields of an excluded date
    pub fn missing_fields(&self, date: NaiveDate) -> Option<&[&'static str]> {
        self.excluded.get(&date).map(Vec::as_slice)
    }

    /// Number of excluded dates
    pub fn len(&self) -> usize {
        self.excluded.len()
    }

    /// Check if no date was excluded
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }
}

/// Output of a feature build
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    /// Feature vectors of eligible dates
    pub features: BTreeMap<NaiveDate, FeatureVector>,
    /// Dates that were dropped and why
    pub exclusions: ExclusionReport,
}

/// Builds feature vectors from an observation store
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Feature vectors of every eligible date
    pub fn build(store: &ObservationStore) -> Result<BTreeMap<NaiveDate, FeatureVector>> {
        Ok(Self::build_report(store)?.features)
    }

    /// Feature vectors plus a record of every excluded date
    pub fn build_report(store: &ObservationStore) -> Result<FeatureSet> {
        let target = store.column(TARGET_COLUMN);
        let lagged: Vec<Vec<Option<f64>>> = LAGS.iter().map(|&k| lag(&target, k)).collect();
        let rolling = ROLLING_WINDOWS
            .iter()
            .map(|&w| rolling_mean(&target, w))
            .collect::<aq_math::Result<Vec<_>>>()?;

        let mut set = FeatureSet::default();
        for (row, observation) in store.iter().enumerate() {
            let candidate = CandidateRow {
                measurements: observation.measurements,
                date: observation.date,
                lags: std::array::from_fn(|i| lagged[i][row]),
                rolling: std::array::from_fn(|i| rolling[i][row]),
            };

            match candidate.validate() {
                Ok(vector) => {
                    set.features.insert(observation.date, vector);
                }
                Err(missing) => {
                    debug!(date = %observation.date, missing = ?missing, "excluded row");
                    set.exclusions.excluded.insert(observation.date, missing);
                }
            }
        }

        if set.features.is_empty() && !store.is_empty() {
            warn!(rows = store.len(), "no row has a complete feature vector");
        }
        info!(
            kept = set.features.len(),
            dropped = set.exclusions.len(),
            "built feature vectors"
        );

        Ok(set)
    }
}
