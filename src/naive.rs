//! Reference triple-loop multiplication.
//!
//! These are the ground truth for the blocked kernel: no tiling, no vectorization,
//! `k` summed in ascending order from `0 + 0i`.

use num::complex::Complex64;
use num::Zero;
use rayon::prelude::*;

use crate::matrix::{element_count, Matrix};

#[inline(always)]
fn dot_row_col(a: &[Complex64], b: &[Complex64], n: usize, i: usize, j: usize) -> Complex64 {
    let mut sum = Complex64::zero();
    for k in 0..n {
        sum += a[i * n + k] * b[k * n + j];
    }
    sum
}

fn check_dims(a: &[Complex64], b: &[Complex64], c: &[Complex64], n: usize) {
    let len = element_count(n);
    assert_eq!(Some(a.len()), len, "Matrix A has incorrect dimensions");
    assert_eq!(Some(b.len()), len, "Matrix B has incorrect dimensions");
    assert_eq!(Some(c.len()), len, "Matrix C has incorrect dimensions");
}

/// Naive i-j-k multiplication of row-major `n × n` slices, overwriting `c`.
///
/// # Panics
///
/// Panics if any slice length differs from `n * n`.
pub fn naive_matmul_slices(a: &[Complex64], b: &[Complex64], c: &mut [Complex64], n: usize) {
    check_dims(a, b, c, n);

    for i in 0..n {
        for j in 0..n {
            c[i * n + j] = dot_row_col(a, b, n, i, j);
        }
    }
}

/// Naive i-j-k multiplication, overwriting `c`.
///
/// # Panics
///
/// Panics if the three matrices do not share the same dimension.
pub fn naive_matmul(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    assert_eq!(a.dim(), b.dim(), "Matrices A and B have different dimensions");
    assert_eq!(a.dim(), c.dim(), "Matrix C has incorrect dimensions");
    let n = a.dim();
    naive_matmul_slices(a.as_slice(), b.as_slice(), c.as_mut_slice(), n);
}

/// Naive multiplication with the rows of `C` spread over the Rayon pool.
///
/// Each entry is computed exactly as in [`naive_matmul`], so the two agree bit for bit.
pub fn par_naive_matmul(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    assert_eq!(a.dim(), b.dim(), "Matrices A and B have different dimensions");
    assert_eq!(a.dim(), c.dim(), "Matrix C has incorrect dimensions");

    let n = a.dim();
    if n == 0 {
        return;
    }
    let (a, b) = (a.as_slice(), b.as_slice());

    c.as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, c_row)| {
            for (j, cell) in c_row.iter_mut().enumerate() {
                *cell = dot_row_col(a, b, n, i, j);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_naive_2x2() {
        // | i 2 | | 1  0 |   | i+2i  4  |
        // | 0 1 | | i  2 | = |  i    2  |
        let a = Matrix::from_vec(2, vec![c(0.0, 1.0), c(2.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)]).unwrap();
        let b = Matrix::from_vec(2, vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 1.0), c(2.0, 0.0)]).unwrap();
        let mut out = Matrix::zeros(2);

        naive_matmul(&a, &b, &mut out);

        assert_eq!(out[(0, 0)], c(0.0, 3.0));
        assert_eq!(out[(0, 1)], c(4.0, 0.0));
        assert_eq!(out[(1, 0)], c(0.0, 1.0));
        assert_eq!(out[(1, 1)], c(2.0, 0.0));
    }

    #[test]
    fn test_naive_overwrites_output() {
        let a = Matrix::identity(3);
        let b = Matrix::from_fn(3, |i, j| c(i as f64, j as f64));
        let mut out = Matrix::from_fn(3, |_, _| c(f64::NAN, 1.0));

        naive_matmul(&a, &b, &mut out);

        assert_eq!(out, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let n = 13;
        let a = Matrix::from_fn(n, |i, j| c((i as f64 * 0.7).sin(), j as f64 * 0.01));
        let b = Matrix::from_fn(n, |i, j| c(j as f64 - i as f64, (i * j) as f64 * 0.5));
        let mut seq = Matrix::zeros(n);
        let mut par = Matrix::zeros(n);

        naive_matmul(&a, &b, &mut seq);
        par_naive_matmul(&a, &b, &mut par);

        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty() {
        let mut out = Matrix::zeros(0);
        par_naive_matmul(&Matrix::zeros(0), &Matrix::zeros(0), &mut out);
        naive_matmul(&Matrix::zeros(0), &Matrix::zeros(0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    #[should_panic(expected = "Matrices A and B have different dimensions")]
    fn test_dimension_mismatch_panics() {
        let mut out = Matrix::zeros(2);
        naive_matmul(&Matrix::zeros(2), &Matrix::zeros(3), &mut out);
    }
}
