//! Lag and rolling-window calculations
//!
//! Contains the two derived-series primitives of the feature pipeline:
//! - Lag (shift a series down by a fixed number of rows)
//! - Rolling mean (arithmetic mean over a trailing window of rows)

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Shift a series down by `periods` rows.
///
/// Row `i` of the output holds row `i - periods` of the input; the first
/// `periods` rows have no predecessor and are `None`.
pub fn lag(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(periods).and_then(|j| values[j]))
        .collect()
}

/// Trailing rolling mean over `period` rows, inclusive of the current row.
///
/// A window is only defined once it holds `period` rows, none of them missing.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Result<Vec<Option<f64>>> {
    let mut window = RollingMean::new(period)?;
    Ok(values
        .iter()
        .map(|value| {
            window.update(*value);
            window.value()
        })
        .collect())
}

/// Rolling mean over a fixed number of rows
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    values: VecDeque<Option<f64>>,
    missing: usize,
}

impl RollingMean {
    /// Create a new rolling mean with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            missing: 0,
        })
    }

    /// Push the next row into the window
    pub fn update(&mut self, value: Option<f64>) {
        let value = value.filter(|v| !v.is_nan());
        if value.is_none() {
            self.missing += 1;
        }
        self.values.push_back(value);

        if self.values.len() > self.period {
            if let Some(None) = self.values.pop_front() {
                self.missing -= 1;
            }
        }
    }

    /// Mean of the current window, if it is full and complete
    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period || self.missing > 0 {
            return None;
        }

        // Summed fresh each time so the result is exactly the mean of the window.
        let sum: f64 = self.values.iter().flatten().sum();
        Some(sum / self.period as f64)
    }
}
