//! Trained regression models consumed by the prediction service
//!
//! A model artifact is a JSON document with two blocks: the feature schema the
//! model was trained against and the model parameters, tagged by `type`.
//!
//! ```json
//! {
//!   "name": "agrimonia-daily",
//!   "schema": { "version": "aq-daily-v1", "features": ["pm10", "..."] },
//!   "model": { "type": "linear", "intercept": 1.2, "coefficients": [0.3, "..."] }
//! }
//! ```
//!
//! Loading rejects any artifact whose schema differs from
//! [`FeatureSchema::current`]; the two are versioned together.

use crate::error::{ForecastError, Result};
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod linear;
pub mod tree_ensemble;

pub use linear::{LinearModel, LinearSpec};
pub use tree_ensemble::{TreeEnsemble, TreeEnsembleSpec, TreeNodeSpec};

/// Vector in, scalar out
pub trait RegressionModel: Debug + Send + Sync {
    /// Predict one value from inputs ordered by the model's schema
    fn predict(&self, input: &[f64]) -> Result<f64>;

    /// Human readable model name
    fn name(&self) -> &str;
}

/// Model parameters, tagged by model family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearSpec),
    TreeEnsemble(TreeEnsembleSpec),
}

/// A serialized trained model together with its input schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Schema the model was trained against
    pub schema: FeatureSchema,
    /// Model parameters
    pub model: ModelSpec,
}

impl ModelArtifact {
    /// Read an artifact from a JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::ModelLoad(format!("cannot open '{}': {}", path.display(), e))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ForecastError::ModelLoad(format!("malformed artifact '{}': {}", path.display(), e))
        })
    }

    /// Parse an artifact from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ForecastError::ModelLoad(format!("malformed artifact: {}", e)))
    }

    /// Check the schema and build an executable model
    pub fn into_model(self) -> Result<Arc<dyn RegressionModel>> {
        let current = FeatureSchema::current();
        current.ensure_compatible(&self.schema)?;

        let model: Arc<dyn RegressionModel> = match self.model {
            ModelSpec::Linear(spec) => Arc::new(LinearModel::from_spec(
                self.name.unwrap_or_else(|| "linear".to_string()),
                spec,
                &current,
            )?),
            ModelSpec::TreeEnsemble(spec) => {
                let name = self
                    .name
                    .unwrap_or_else(|| format!("tree_ensemble ({} trees)", spec.trees.len()));
                Arc::new(TreeEnsemble::from_spec(name, spec, &current)?)
            }
        };

        Ok(model)
    }
}

/// Load and validate a model artifact from disk
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Arc<dyn RegressionModel>> {
    let path = path.as_ref();
    let model = ModelArtifact::from_path(path)?.into_model()?;
    info!(path = %path.display(), model = model.name(), "loaded model artifact");
    Ok(model)
}

/// Reject inputs whose width differs from the model's
pub(crate) fn check_width(model: &str, expected: usize, input: &[f64]) -> Result<()> {
    if input.len() != expected {
        return Err(ForecastError::Prediction(format!(
            "{} expects {} features, got {}",
            model,
            expected,
            input.len()
        )));
    }
    Ok(())
}
