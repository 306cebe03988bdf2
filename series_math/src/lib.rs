//! # Series Math
//!
//! Numeric building blocks for fitting additive time series models.
//! This crate provides a small dense matrix type, ridge-penalized least
//! squares, Fourier seasonality terms and the summary statistics used to
//! derive uncertainty intervals.

use thiserror::Error;

pub mod fourier;
pub mod linalg;
pub mod stats;

pub use linalg::{ridge_least_squares, Matrix};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
