//! Named, versioned model input schema
//!
//! The feature builder, the CSV export and the model artifact loader all read
//! column names and their order from here. Changing any of them is a schema
//! change and needs a new [`SCHEMA_VERSION`] together with a retrained model.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Version tag shared by the feature pipeline and compatible model artifacts
pub const SCHEMA_VERSION: &str = "aq-daily-v1";

/// Name of the date column in the observation source
pub const DATE_COLUMN: &str = "date";

/// Measurement lagged and averaged to produce the history features
pub const TARGET_COLUMN: &str = "pm25";

/// Every measurement column the observation source must provide
pub const RAW_MEASUREMENTS: [&str; 10] = [
    "pm25",
    "pm10",
    "no2",
    "co",
    "nh3",
    "temp_c",
    "humidity",
    "wind_m_s",
    "precip_mm",
    "press_hPa",
];

/// Raw measurements passed to the model unchanged
pub const RAW_PREDICTORS: [&str; 9] = [
    "pm10",
    "no2",
    "co",
    "nh3",
    "temp_c",
    "humidity",
    "wind_m_s",
    "precip_mm",
    "press_hPa",
];

/// Row offsets of the lagged target features
pub const LAGS: [usize; 3] = [1, 2, 3];

/// Feature names of the lagged target, aligned with [`LAGS`]
pub const LAG_FEATURES: [&str; 3] = ["pm25_lag1", "pm25_lag2", "pm25_lag3"];

/// Row counts of the trailing rolling-mean features
pub const ROLLING_WINDOWS: [usize; 2] = [7, 14];

/// Feature names of the rolling means, aligned with [`ROLLING_WINDOWS`]
pub const ROLLING_FEATURES: [&str; 2] = ["pm25_roll7", "pm25_roll14"];

/// Feature names derived from the calendar date
pub const CALENDAR_FEATURES: [&str; 3] = ["dayofyear", "month", "weekday"];

/// Model input columns, in the order the model was trained on
pub const FEATURE_COLUMNS: [&str; 17] = [
    "pm10",
    "no2",
    "co",
    "nh3",
    "temp_c",
    "humidity",
    "wind_m_s",
    "precip_mm",
    "press_hPa",
    "dayofyear",
    "month",
    "weekday",
    "pm25_lag1",
    "pm25_lag2",
    "pm25_lag3",
    "pm25_roll7",
    "pm25_roll14",
];

/// Number of leading rows that can never carry a complete feature vector
pub fn warm_up_rows() -> usize {
    let longest_window = ROLLING_WINDOWS.iter().copied().max().unwrap_or(1);
    let longest_lag = LAGS.iter().copied().max().unwrap_or(0);
    (longest_window - 1).max(longest_lag)
}

/// A model input schema: a version tag plus ordered feature names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Schema version tag
    pub version: String,
    /// Ordered feature names
    pub features: Vec<String>,
}

impl FeatureSchema {
    /// The schema produced by this build of the feature pipeline
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            features: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Number of model inputs
    pub fn width(&self) -> usize {
        self.features.len()
    }

    /// Position of a feature in the model input
    pub fn position(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    /// Check that an artifact's schema matches this one exactly
    pub fn ensure_compatible(&self, other: &FeatureSchema) -> Result<()> {
        if self.version != other.version {
            return Err(ForecastError::ModelLoad(format!(
                "schema version mismatch: pipeline produces '{}', artifact expects '{}'",
                self.version, other.version
            )));
        }

        if self.features != other.features {
            return Err(ForecastError::ModelLoad(format!(
                "feature columns mismatch for schema '{}': pipeline produces [{}], artifact expects [{}]",
                self.version,
                self.features.join(", "),
                other.features.join(", ")
            )));
        }

        Ok(())
    }
}
