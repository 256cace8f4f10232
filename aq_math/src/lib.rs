//! # AQ Math
//!
//! Window calculations used by the air quality feature pipeline.
//! Every function here works on row positions of an already sorted series:
//! a lag of one means "the row above", regardless of calendar gaps.
//! Missing readings are represented as `None` and propagate to any
//! window that touches them.

use thiserror::Error;

pub mod windows;

pub use windows::{lag, rolling_mean, RollingMean};

/// Errors that can occur in window calculations
#[derive(Error, Debug, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for window calculations
pub type Result<T> = std::result::Result<T, MathError>;
