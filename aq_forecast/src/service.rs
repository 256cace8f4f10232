//! Per-request forecast lookup over the startup-built index and model

use crate::error::{ForecastError, Result};
use crate::index::ForecastIndex;
use crate::models::RegressionModel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Predicted PM2.5 for one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Requested date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Predicted PM2.5 concentration
    pub pm25: f64,
}

/// Dates the service can answer for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableRange {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    /// Number of forecastable dates; gaps inside the range are not counted
    pub count: usize,
}

/// Read-only forecast service. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct PredictionService {
    index: Arc<ForecastIndex>,
    model: Arc<dyn RegressionModel>,
}

impl PredictionService {
    /// Create a service from a built index and a loaded model
    pub fn new(index: ForecastIndex, model: Arc<dyn RegressionModel>) -> Self {
        Self {
            index: Arc::new(index),
            model,
        }
    }

    /// The feature index
    pub fn index(&self) -> &ForecastIndex {
        &self.index
    }

    /// Name of the loaded model
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// First and last forecastable dates
    pub fn available_range(&self) -> Option<AvailableRange> {
        self.index.range().map(|(min_date, max_date)| AvailableRange {
            min_date,
            max_date,
            count: self.index.len(),
        })
    }

    /// Parse a `YYYY-MM-DD` date and forecast it
    pub fn forecast_str(&self, raw: &str) -> Result<Forecast> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| ForecastError::InvalidDate(raw.to_string()))?;
        self.forecast(date)
    }

    /// Forecast PM2.5 for an indexed date
    pub fn forecast(&self, date: NaiveDate) -> Result<Forecast> {
        let features = self
            .index
            .get(date)
            .ok_or(ForecastError::NotFound(date))?;

        let input = features.to_model_input();
        let pm25 = self.model.predict(&input).map_err(|e| {
            let cause = match e {
                ForecastError::Prediction(cause) => cause,
                other => other.to_string(),
            };
            error!(%date, model = self.model.name(), %cause, "model invocation failed");
            ForecastError::Prediction(cause)
        })?;

        if !pm25.is_finite() {
            error!(%date, model = self.model.name(), pm25, "model returned a non-finite value");
            return Err(ForecastError::Prediction(format!(
                "model returned non-finite value {}",
                pm25
            )));
        }

        debug!(%date, pm25, "forecast served");
        Ok(Forecast { date, pm25 })
    }
}
