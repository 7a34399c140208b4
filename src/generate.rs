//! Random input matrices.
//!
//! Real and imaginary parts are drawn independently and uniformly from `[0, 1)`.

use num::complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::matrix::Matrix;

#[inline(always)]
fn random_complex<R: Rng + ?Sized>(rng: &mut R) -> Complex64 {
    Complex64::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0))
}

/// Fills an `n × n` matrix in row-major order from `rng`.
pub fn random_matrix<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Matrix {
    Matrix::from_fn(n, |_, _| random_complex(rng))
}

/// Seed for row `row` of a matrix generated from `seed`.
#[inline(always)]
fn row_seed(seed: u64, row: usize) -> u64 {
    seed ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Fills rows in parallel, each row from its own [`StdRng`].
///
/// The result depends only on `(n, seed)`, never on how rows are scheduled.
pub fn par_random_matrix(n: usize, seed: u64) -> Matrix {
    let mut m = Matrix::zeros(n);
    if n == 0 {
        return m;
    }

    m.as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(row, values)| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, row));
            for value in values {
                *value = random_complex(&mut rng);
            }
        });

    m
}
