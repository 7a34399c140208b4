//! # cmatmul
//!
//! Square complex double-precision matrix multiplication, `C = A · B`, with a
//! cache-blocked kernel that accumulates each output tile on the stack, batches
//! [`UNROLL`] rows per broadcast of `B(k, j)`, runs the complex multiply-accumulate on
//! SIMD lanes and spreads tiles across a Rayon pool.
//!
//! ```rust
//! use cmatmul::{blocked_matmul, Matrix};
//! use num::complex::Complex64;
//!
//! let a = Matrix::from_fn(3, |i, j| Complex64::new(i as f64, j as f64));
//! let id = Matrix::identity(3);
//! let mut c = Matrix::zeros(3);
//!
//! blocked_matmul(&a, &id, &mut c);
//! assert_eq!(c, a);
//! ```
//!
//! All matrices are **row-major**: element `(i, j)` of an `n × n` matrix is at `i * n + j`.

pub mod blocked;
pub mod error;
pub mod generate;
pub mod harness;
pub mod matrix;
pub mod naive;
pub mod reference;
pub mod simd;

/// Side of the square output tiles and of the `k` chunks.
pub const BLOCK_SIZE: usize = 64;

/// Rows of `A` processed together per broadcast `B(k, j)`.
pub const UNROLL: usize = 4;

pub use blocked::{
    blocked_matmul, blocked_matmul_slices, blocked_matmul_with, KernelOptions, Schedule,
    MAX_BLOCK_SIZE,
};
pub use error::{MatmulError, Result};
pub use matrix::Matrix;
pub use naive::{naive_matmul, naive_matmul_slices, par_naive_matmul};
pub use simd::Backend;
