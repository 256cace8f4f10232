//! One-shot startup pipeline: observations → features → index → model

use crate::data::{DataLoader, ObservationStore};
use crate::error::{ForecastError, Result};
use crate::features::FeatureBuilder;
use crate::index::ForecastIndex;
use crate::models::load_model;
use crate::schema::warm_up_rows;
use crate::service::PredictionService;
use std::path::Path;
use tracing::info;

/// Startup wiring for the prediction service
#[derive(Debug)]
pub struct ForecastPipeline;

impl ForecastPipeline {
    /// Build the full service. Any failure is fatal; there is no partial start.
    pub fn bootstrap<D, M>(data_path: D, model_path: M) -> Result<PredictionService>
    where
        D: AsRef<Path>,
        M: AsRef<Path>,
    {
        let store = DataLoader::from_path(data_path.as_ref())?;
        let index = Self::build_index(&store)?;
        let model = load_model(model_path)?;

        let service = PredictionService::new(index, model);
        if let Some(range) = service.available_range() {
            info!(
                min_date = %range.min_date,
                max_date = %range.max_date,
                dates = range.count,
                model = service.model_name(),
                "forecast service ready"
            );
        }
        Ok(service)
    }

    /// Load observations and build the index, without a model
    pub fn index_from_path<P: AsRef<Path>>(data_path: P) -> Result<ForecastIndex> {
        let store = DataLoader::from_path(data_path)?;
        Self::build_index(&store)
    }

    /// Build the feature index; an index with no dates is an error
    pub fn build_index(store: &ObservationStore) -> Result<ForecastIndex> {
        let features = FeatureBuilder::build(store)?;
        if features.is_empty() {
            return Err(ForecastError::DataLoad(format!(
                "no date has a complete feature vector ({} observations, at least {} needed)",
                store.len(),
                warm_up_rows() + 1
            )));
        }

        let index = ForecastIndex::build(features);
        info!(dates = index.len(), "built forecast index");
        Ok(index)
    }
}
