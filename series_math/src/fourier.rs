//! Fourier terms for periodic components
//!
//! A seasonality of period `P` and order `N` is modelled as
//! `Σ_{n=1..N} a_n·sin(2πnt/P) + b_n·cos(2πnt/P)`, with `t` measured in days.

use crate::linalg::Matrix;
use crate::{MathError, Result};
use std::f64::consts::PI;

/// Build the `2 * order` Fourier columns for every time point
///
/// Columns are ordered `sin(1), cos(1), sin(2), cos(2), ...`.
pub fn fourier_features(t_days: &[f64], period: f64, order: usize) -> Result<Matrix> {
    if period <= 0.0 || !period.is_finite() {
        return Err(MathError::InvalidInput(
            "Seasonal period must be positive".to_string(),
        ));
    }
    if order == 0 {
        return Err(MathError::InvalidInput(
            "Fourier order must be at least 1".to_string(),
        ));
    }

    let mut features = Matrix::zeros(t_days.len(), 2 * order);
    for (row, &t) in t_days.iter().enumerate() {
        for n in 1..=order {
            let angle = 2.0 * PI * n as f64 * t / period;
            features.set(row, 2 * (n - 1), angle.sin());
            features.set(row, 2 * (n - 1) + 1, angle.cos());
        }
    }

    Ok(features)
}
