//! Linear regression model

use crate::error::{ForecastError, Result};
use crate::models::{check_width, RegressionModel};
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};

/// Serialized linear model parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSpec {
    /// Constant term
    pub intercept: f64,
    /// One weight per schema feature, in schema order
    pub coefficients: Vec<f64>,
}

/// Linear regression: `intercept + Σ coefficient_i * x_i`
#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    /// Create a linear model for the given schema
    pub fn from_spec(name: String, spec: LinearSpec, schema: &FeatureSchema) -> Result<Self> {
        if spec.coefficients.len() != schema.width() {
            return Err(ForecastError::ModelLoad(format!(
                "linear model has {} coefficients, schema '{}' has {} features",
                spec.coefficients.len(),
                schema.version,
                schema.width()
            )));
        }

        if !spec.intercept.is_finite() || spec.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::ModelLoad(
                "linear model parameters must be finite".to_string(),
            ));
        }

        Ok(Self {
            name,
            intercept: spec.intercept,
            coefficients: spec.coefficients,
        })
    }
}

impl RegressionModel for LinearModel {
    fn predict(&self, input: &[f64]) -> Result<f64> {
        check_width(&self.name, self.coefficients.len(), input)?;

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(input)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
