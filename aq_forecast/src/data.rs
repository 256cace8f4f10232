//! Raw daily observation loading and storage

use crate::error::{ForecastError, Result};
use crate::schema::{DATE_COLUMN, RAW_MEASUREMENTS};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Days between 0001-01-01 and 1970-01-01, the epoch of polars `Date` values
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Cell contents read as a missing measurement
const MISSING_TOKENS: [&str; 5] = ["", "NA", "NaN", "nan", "null"];

/// Raw measurements for one day. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Fine particulate matter, the forecast target
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub co: Option<f64>,
    pub nh3: Option<f64>,
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_m_s: Option<f64>,
    pub precip_mm: Option<f64>,
    #[serde(rename = "press_hPa")]
    pub press_hpa: Option<f64>,
}

impl Measurements {
    /// Look a measurement up by its source column name
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            "pm25" => self.pm25,
            "pm10" => self.pm10,
            "no2" => self.no2,
            "co" => self.co,
            "nh3" => self.nh3,
            "temp_c" => self.temp_c,
            "humidity" => self.humidity,
            "wind_m_s" => self.wind_m_s,
            "precip_mm" => self.precip_mm,
            "press_hPa" => self.press_hpa,
            _ => None,
        }
    }

    fn slot_mut(&mut self, column: &str) -> Option<&mut Option<f64>> {
        match column {
            "pm25" => Some(&mut self.pm25),
            "pm10" => Some(&mut self.pm10),
            "no2" => Some(&mut self.no2),
            "co" => Some(&mut self.co),
            "nh3" => Some(&mut self.nh3),
            "temp_c" => Some(&mut self.temp_c),
            "humidity" => Some(&mut self.humidity),
            "wind_m_s" => Some(&mut self.wind_m_s),
            "precip_mm" => Some(&mut self.precip_mm),
            "press_hPa" => Some(&mut self.press_hpa),
            _ => None,
        }
    }
}

/// One raw daily record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar day, unique within a store
    pub date: NaiveDate,
    /// Measurements taken on that day
    pub measurements: Measurements,
}

impl Observation {
    /// Create a new observation
    pub fn new(date: NaiveDate, measurements: Measurements) -> Self {
        Self { date, measurements }
    }
}

/// Observations sorted ascending by date, at most one per date
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    /// Sort observations by date and reject duplicate dates
    pub fn from_observations(mut observations: Vec<Observation>) -> Result<Self> {
        observations.sort_by_key(|o| o.date);

        if let Some(pair) = observations.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::DataLoad(format!(
                "duplicate observation for {}",
                pair[0].date
            )));
        }

        Ok(Self { observations })
    }

    /// Observations in ascending date order
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Iterate observations in ascending date order
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Row position of a date in the sorted sequence
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
    }

    /// Observation recorded on a date
    pub fn get(&self, date: NaiveDate) -> Option<&Observation> {
        self.position(date).map(|i| &self.observations[i])
    }

    /// Earliest observed date
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    /// Latest observed date
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Values of one measurement column in row order
    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.observations
            .iter()
            .map(|o| o.measurements.value(name))
            .collect()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Get the number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }
}

/// Data loader for daily observation files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load observations from a CSV or Parquet file, chosen by extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ObservationStore> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") | Some("pq") => Self::from_parquet(path),
            _ => Self::from_csv(path),
        }
    }

    /// Load observations from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<ObservationStore> {
        let path = path.as_ref();
        let file = Self::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let store = Self::from_dataframe(&df)?;
        info!(path = %path.display(), rows = store.len(), "loaded observations");
        Ok(store)
    }

    /// Load observations from a Parquet file
    pub fn from_parquet<P: AsRef<Path>>(path: P) -> Result<ObservationStore> {
        let path = path.as_ref();
        let file = Self::open(path)?;
        let df = ParquetReader::new(file).finish()?;

        let store = Self::from_dataframe(&df)?;
        info!(path = %path.display(), rows = store.len(), "loaded observations");
        Ok(store)
    }

    /// Build a store from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame) -> Result<ObservationStore> {
        Self::check_required_columns(df)?;

        let dates = Self::date_column(df)?;
        let mut observations: Vec<Observation> = dates
            .into_iter()
            .map(|date| Observation::new(date, Measurements::default()))
            .collect();

        for name in RAW_MEASUREMENTS {
            let values = Self::measurement_column(df, name)?;
            for (observation, value) in observations.iter_mut().zip(values) {
                if let Some(slot) = observation.measurements.slot_mut(name) {
                    *slot = value;
                }
            }
        }

        debug!(rows = observations.len(), "parsed observation frame");
        ObservationStore::from_observations(observations)
    }

    fn open(path: &Path) -> Result<File> {
        File::open(path).map_err(|e| {
            ForecastError::DataLoad(format!("cannot open '{}': {}", path.display(), e))
        })
    }

    /// Report every required column the frame lacks
    fn check_required_columns(df: &DataFrame) -> Result<()> {
        let column_names = df.get_column_names();
        let missing: Vec<&str> = std::iter::once(DATE_COLUMN)
            .chain(RAW_MEASUREMENTS)
            .filter(|required| !column_names.contains(required))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::DataLoad(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }

    fn date_column(df: &DataFrame) -> Result<Vec<NaiveDate>> {
        let col = df.column(DATE_COLUMN)?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| {
                    cell.and_then(parse_date).ok_or_else(|| {
                        ForecastError::DataLoad(format!(
                            "row {}: cannot parse date '{}'",
                            row,
                            cell.unwrap_or_default()
                        ))
                    })
                })
                .collect(),
            DataType::Date | DataType::Datetime(_, _) => {
                let days = col.cast(&DataType::Date)?;
                days.date()?
                    .into_iter()
                    .enumerate()
                    .map(|(row, day)| {
                        day.and_then(|d| {
                            NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAYS_FROM_CE + d)
                        })
                        .ok_or_else(|| {
                            ForecastError::DataLoad(format!("row {}: missing date", row))
                        })
                    })
                    .collect()
            }
            other => Err(ForecastError::DataLoad(format!(
                "column '{}' has unsupported type {}",
                DATE_COLUMN, other
            ))),
        }
    }

    fn measurement_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(name)?;

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .enumerate()
                .map(|(row, cell)| parse_measurement(cell).map_err(|bad| {
                    ForecastError::DataLoad(format!(
                        "row {}: column '{}' holds non-numeric value '{}'",
                        row, name, bad
                    ))
                }))
                .collect(),
            DataType::Null => Ok(vec![None; col.len()]),
            dtype if dtype.is_numeric() => {
                let floats = col.cast(&DataType::Float64)?;
                Ok(floats
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect())
            }
            other => Err(ForecastError::DataLoad(format!(
                "column '{}' has unsupported type {}",
                name, other
            ))),
        }
    }
}

/// Parse `YYYY-MM-DD`, ignoring a trailing time component
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    match raw.get(10..11) {
        Some(" ") | Some("T") => raw
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
        _ => None,
    }
}

/// Parse one text cell; `Err` carries the offending text
fn parse_measurement(cell: Option<&str>) -> std::result::Result<Option<f64>, String> {
    let Some(cell) = cell.map(str::trim) else {
        return Ok(None);
    };
    if MISSING_TOKENS.contains(&cell) {
        return Ok(None);
    }

    cell.parse::<f64>()
        .map(|v| Some(v).filter(|x| !x.is_nan()))
        .map_err(|_| cell.to_string())
}
