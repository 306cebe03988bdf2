//! Dense linear algebra for small regression problems
//!
//! Design matrices for the additive model have a few dozen columns and a
//! few thousand rows, so the normal equations are formed explicitly and
//! solved with a Cholesky factorization.

use crate::{MathError, Result};

/// Added to every diagonal entry of the normal matrix so unpenalized,
/// collinear columns still factorize.
const DIAGONAL_FLOOR: f64 = 1e-9;

/// Row-major dense matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from equally sized rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(MathError::InvalidInput(
                "All rows must have the same number of columns".to_string(),
            ));
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Overwrite the value at `(row, col)`
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Append the columns of `other` to the right of `self`
    pub fn hstack(&self, other: &Matrix) -> Result<Matrix> {
        if self.rows != other.rows {
            return Err(MathError::InvalidInput(format!(
                "Cannot stack matrices with {} and {} rows",
                self.rows, other.rows
            )));
        }

        let cols = self.cols + other.cols;
        let mut data = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            data.extend_from_slice(self.row(r));
            data.extend_from_slice(other.row(r));
        }

        Ok(Matrix {
            rows: self.rows,
            cols,
            data,
        })
    }

    /// Matrix-vector product
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.cols {
            return Err(MathError::InvalidInput(format!(
                "Vector length ({}) doesn't match column count ({})",
                v.len(),
                self.cols
            )));
        }

        Ok((0..self.rows)
            .map(|r| self.row(r).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }
}

/// Solve `min ||X b - y||² + Σ penalties[j] · b[j]²`
///
/// `penalties` holds one non-negative weight per column of `design`.
pub fn ridge_least_squares(design: &Matrix, target: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    let n = design.rows();
    let p = design.cols();

    if n == 0 || p == 0 {
        return Err(MathError::InsufficientData(
            "Design matrix is empty".to_string(),
        ));
    }
    if target.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Target length ({}) doesn't match row count ({})",
            target.len(),
            n
        )));
    }
    if penalties.len() != p {
        return Err(MathError::InvalidInput(format!(
            "Expected {} penalties, got {}",
            p,
            penalties.len()
        )));
    }
    if penalties.iter().any(|w| *w < 0.0 || !w.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    // Normal equations: (XᵀX + Λ) b = Xᵀy
    let mut normal = vec![0.0; p * p];
    let mut rhs = vec![0.0; p];
    for r in 0..n {
        let row = design.row(r);
        let y = target[r];
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            rhs[i] += xi * y;
            for j in i..p {
                normal[i * p + j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        for j in 0..i {
            normal[i * p + j] = normal[j * p + i];
        }
        normal[i * p + i] += penalties[i] + DIAGONAL_FLOOR;
    }

    cholesky_solve(normal, &rhs)
}

/// Solve `A x = b` for a symmetric positive definite `A` (row-major, n×n)
pub fn cholesky_solve(mut a: Vec<f64>, b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n * n {
        return Err(MathError::InvalidInput(format!(
            "Expected a {}x{} matrix",
            n, n
        )));
    }

    // In-place factorization: lower triangle of `a` becomes L
    for j in 0..n {
        let mut diag = a[j * n + j];
        for k in 0..j {
            diag -= a[j * n + k] * a[j * n + k];
        }
        if diag <= 0.0 || !diag.is_finite() {
            return Err(MathError::CalculationError(format!(
                "Matrix is not positive definite (pivot {} = {})",
                j, diag
            )));
        }
        let diag = diag.sqrt();
        a[j * n + j] = diag;

        for i in (j + 1)..n {
            let mut value = a[i * n + j];
            for k in 0..j {
                value -= a[i * n + k] * a[j * n + k];
            }
            a[i * n + j] = value / diag;
        }
    }

    // Forward substitution: L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut value = b[i];
        for k in 0..i {
            value -= a[i * n + k] * z[k];
        }
        z[i] = value / a[i * n + i];
    }

    // Back substitution: Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut value = z[i];
        for k in (i + 1)..n {
            value -= a[k * n + i] * x[k];
        }
        x[i] = value / a[i * n + i];
    }

    Ok(x)
}
