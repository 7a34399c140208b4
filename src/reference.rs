//! Dense linear-algebra comparator.
//!
//! `ndarray`'s general matrix product stands in for a vendor `zgemm` call
//! (`alpha = 1`, `beta = 0`, row-major, no transposition). It is only used to judge the
//! speed and accuracy of the blocked kernel.

use ndarray::Array2;
use num::complex::Complex64;

use crate::error::{dimension_mismatch, Result};
use crate::matrix::Matrix;

/// Copies a [`Matrix`] into a standard-layout `Array2`.
pub fn to_array2(m: &Matrix) -> Array2<Complex64> {
    let n = m.dim();
    Array2::from_shape_fn((n, n), |(i, j)| m[(i, j)])
}

/// Copies an `n × n` array back into a [`Matrix`], whatever its memory order.
pub fn from_array2(array: &Array2<Complex64>) -> Result<Matrix> {
    let (rows, cols) = array.dim();
    if rows != cols {
        return Err(dimension_mismatch(rows, cols, "from_array2"));
    }
    Matrix::from_vec(rows, array.iter().copied().collect())
}

/// `A · B` through `ndarray::linalg`.
pub fn reference_matmul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.dim() != b.dim() {
        return Err(dimension_mismatch(a.dim(), b.dim(), "reference_matmul"));
    }
    let product = to_array2(a).dot(&to_array2(b));
    from_array2(&product)
}
