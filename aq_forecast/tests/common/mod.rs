#![allow(dead_code)]

use aq_forecast::error::{ForecastError, Result};
use aq_forecast::{Measurements, Observation, ObservationStore, RegressionModel};
use chrono::{Duration, NaiveDate};
use std::io::Write;
use tempfile::NamedTempFile;

pub const HEADER: &str = "date,pm25,pm10,no2,co,nh3,temp_c,humidity,wind_m_s,precip_mm,press_hPa";

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

pub fn nth_day(n: usize) -> NaiveDate {
    start_date() + Duration::days(n as i64)
}

/// A CSV line with fixed predictor values
pub fn csv_row(date: NaiveDate, pm25: &str) -> String {
    format!(
        "{},{},20.5,31.0,0.4,5.2,12.0,70.0,2.5,0.0,1013.2",
        date, pm25
    )
}

/// Deterministic, non-constant PM2.5 values
pub fn pm25_values(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10.0 + ((i * 7) % 11) as f64 + i as f64 * 0.5)
        .collect()
}

/// Write a CSV with the standard header and the given data lines
pub fn csv_file(lines: &[String]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

/// A contiguous daily CSV of `n` rows
pub fn daily_csv(n: usize) -> NamedTempFile {
    let lines: Vec<String> = pm25_values(n)
        .iter()
        .enumerate()
        .map(|(i, v)| csv_row(nth_day(i), &v.to_string()))
        .collect();
    csv_file(&lines)
}

pub fn complete_measurements(pm25: Option<f64>) -> Measurements {
    Measurements {
        pm25,
        pm10: Some(20.5),
        no2: Some(31.0),
        co: Some(0.4),
        nh3: Some(5.2),
        temp_c: Some(12.0),
        humidity: Some(70.0),
        wind_m_s: Some(2.5),
        precip_mm: Some(0.0),
        press_hpa: Some(1013.2),
    }
}

/// A store with complete predictors on the given dates
pub fn store_on(dates: &[NaiveDate], pm25: &[Option<f64>]) -> ObservationStore {
    let observations = dates
        .iter()
        .zip(pm25)
        .map(|(date, value)| Observation::new(*date, complete_measurements(*value)))
        .collect();
    ObservationStore::from_observations(observations).unwrap()
}

/// A contiguous daily store
pub fn daily_store(pm25: &[Option<f64>]) -> ObservationStore {
    let dates: Vec<NaiveDate> = (0..pm25.len()).map(nth_day).collect();
    store_on(&dates, pm25)
}

/// Linear artifact predicting `intercept + pm25_roll7`
pub fn roll7_model_json(intercept: f64) -> String {
    let mut coefficients = vec![0.0; 17];
    coefficients[15] = 1.0;
    serde_json::json!({
        "name": "roll7-echo",
        "schema": aq_forecast::FeatureSchema::current(),
        "model": { "type": "linear", "intercept": intercept, "coefficients": coefficients }
    })
    .to_string()
}

pub fn model_file(json: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Returns `pm25_roll7` unchanged
#[derive(Debug)]
pub struct Roll7Model;

impl RegressionModel for Roll7Model {
    fn predict(&self, input: &[f64]) -> Result<f64> {
        Ok(input[15])
    }

    fn name(&self) -> &str {
        "roll7"
    }
}

/// Always fails, like a booster rejecting its input
#[derive(Debug)]
pub struct FailingModel;

impl RegressionModel for FailingModel {
    fn predict(&self, _input: &[f64]) -> Result<f64> {
        Err(ForecastError::Prediction(
            "feature_names mismatch: expected 18 columns".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Returns a fixed value
#[derive(Debug)]
pub struct ConstantModel(pub f64);

impl RegressionModel for ConstantModel {
    fn predict(&self, _input: &[f64]) -> Result<f64> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "constant"
    }
}
