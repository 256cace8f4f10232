//! # aq_server
//!
//! HTTP adapter over [`aq_forecast::PredictionService`] plus the command-line
//! entry points used to run it.

use aq_forecast::{ForecastError, PredictionService};
use axum::{routing::get, Router};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
}

/// Errors that stop the binary
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the router over a ready service
pub fn app(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/health", get(routes::liveness))
        .route("/forecast", get(routes::forecast))
        .route("/forecast/range", get(routes::range))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}
