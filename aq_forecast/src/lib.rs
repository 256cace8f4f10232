//! # AQ Forecast
//!
//! Daily PM2.5 forecasting backed by a precomputed feature index and a trained
//! regression model.
//!
//! ## Features
//!
//! - Raw daily observation loading (CSV or Parquet)
//! - Deterministic feature engineering: calendar fields, lagged values and
//!   trailing rolling means of PM2.5
//! - An immutable date → feature-vector index
//! - Linear and tree-ensemble model artifacts tied to a versioned feature schema
//! - A read-only prediction service safe to share across request handlers
//!
//! ## Quick Start
//!
//! ```no_run
//! use aq_forecast::pipeline::ForecastPipeline;
//!
//! // Load data, build features and the index, then load the model
//! let service = ForecastPipeline::bootstrap(
//!     "data/agrimonia_daily.csv",
//!     "models/aq_daily_model.json",
//! )?;
//!
//! // Forecast a date inside the available range
//! let forecast = service.forecast_str("2021-06-01")?;
//! println!("{}: {:.2}", forecast.date, forecast.pm25);
//! # Ok::<(), aq_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod error;
pub mod export;
pub mod features;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod service;

// Re-export commonly used types
pub use crate::data::{DataLoader, Measurements, Observation, ObservationStore};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{ExclusionReport, FeatureBuilder, FeatureSet, FeatureVector};
pub use crate::index::ForecastIndex;
pub use crate::models::{load_model, ModelArtifact, RegressionModel};
pub use crate::pipeline::ForecastPipeline;
pub use crate::schema::FeatureSchema;
pub use crate::service::{AvailableRange, Forecast, PredictionService};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
