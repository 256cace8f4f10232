//! # AQ Forecast Workspace
//!
//! Facade over the workspace crates:
//!
//! - [`aq_math`]: position-based lag and rolling-window primitives
//! - [`aq_forecast`]: observation store, feature pipeline, index, models and
//!   the prediction service
//!
//! The HTTP server lives in the `aq_server` binary crate.
//!
//! ## Example
//!
//! ```
//! use aq_forecast_workspace::math::rolling_mean;
//!
//! let values = [Some(1.0), Some(2.0), Some(3.0)];
//! let means = rolling_mean(&values, 2).unwrap();
//! assert_eq!(means, vec![None, Some(1.5), Some(2.5)]);
//! ```

pub use aq_forecast as forecast;
pub use aq_math as math;

pub use aq_forecast::{
    FeatureBuilder, FeatureSchema, FeatureVector, ForecastError, ForecastIndex, ForecastPipeline,
    PredictionService,
};
