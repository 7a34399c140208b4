//! Square complex matrix storage.
//!
//! [`Matrix`] is a flat **row-major** buffer of `n × n` [`Complex64`] values together
//! with its dimension: element `(i, j)` lives at offset `i * n + j`. The dimension is
//! validated once at construction, so a `Matrix` can never carry a buffer whose length
//! disagrees with `n`.

use std::fmt;
use std::ops::{Index, IndexMut};

use num::complex::Complex64;
use num::Zero;

use crate::blocked::blocked_matmul;
use crate::error::{allocation_error, dimension_mismatch, layout_error, Result};

/// Number of elements in an `n × n` matrix, or `None` on overflow.
#[inline(always)]
pub(crate) fn element_count(n: usize) -> Option<usize> {
    n.checked_mul(n)
}

/// Row-major `n × n` matrix of complex doubles.
#[derive(Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<Complex64>,
}

impl Matrix {
    /// Creates an `n × n` matrix filled with `0 + 0i`.
    ///
    /// # Panics
    ///
    /// Panics if `n * n` overflows or the allocation fails, like `vec!`.
    /// Use [`Matrix::try_zeros`] to handle those cases.
    pub fn zeros(n: usize) -> Self {
        Matrix {
            n,
            data: vec![Complex64::zero(); n * n],
        }
    }

    /// Fallible version of [`Matrix::zeros`].
    ///
    /// This is the buffer-acquisition step for results: a dimension whose element or
    /// byte count overflows yields [`MatmulError::Layout`](crate::MatmulError::Layout)
    /// and an allocator refusal yields
    /// [`MatmulError::Allocation`](crate::MatmulError::Allocation).
    pub fn try_zeros(n: usize) -> Result<Self> {
        let len = element_count(n).ok_or_else(|| layout_error(n, "n * n overflows usize"))?;
        let bytes = len
            .checked_mul(std::mem::size_of::<Complex64>())
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(|| layout_error(n, "buffer size exceeds isize::MAX bytes"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| allocation_error(bytes, e.to_string()))?;
        data.resize(len, Complex64::zero());

        Ok(Matrix { n, data })
    }

    /// Wraps an existing row-major buffer.
    ///
    /// Returns [`MatmulError::DimensionMismatch`](crate::MatmulError::DimensionMismatch)
    /// when `data.len() != n * n`.
    pub fn from_vec(n: usize, data: Vec<Complex64>) -> Result<Self> {
        let expected = element_count(n).ok_or_else(|| layout_error(n, "n * n overflows usize"))?;
        if data.len() != expected {
            return Err(dimension_mismatch(expected, data.len(), "Matrix::from_vec"));
        }
        Ok(Matrix { n, data })
    }

    /// Builds a matrix by evaluating `f(i, j)` for every entry in row-major order.
    pub fn from_fn<F>(n: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Complex64,
    {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Matrix { n, data }
    }

    /// The complex identity: `1 + 0i` on the diagonal, `0` elsewhere.
    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n);
        for i in 0..n {
            m.data[i * n + i] = Complex64::new(1.0, 0.0);
        }
        m
    }

    /// Side length of the matrix.
    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Number of stored elements (`n * n`).
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<Complex64> {
        self.data
    }

    /// Returns the entry at `(i, j)`, or `None` if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<&Complex64> {
        if i < self.n && j < self.n {
            self.data.get(i * self.n + j)
        } else {
            None
        }
    }

    /// Resets every entry to `0 + 0i`, keeping the allocation.
    pub fn fill_zero(&mut self) {
        self.data.fill(Complex64::zero());
    }

    /// Largest modulus of the entrywise difference `self - other`.
    ///
    /// Returns `0.0` for empty matrices.
    pub fn max_abs_diff(&self, other: &Matrix) -> Result<f64> {
        if self.n != other.n {
            return Err(dimension_mismatch(self.n, other.n, "Matrix::max_abs_diff"));
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f64::max))
    }

    /// Computes `self · rhs` with the blocked kernel into a freshly acquired matrix.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.n != rhs.n {
            return Err(dimension_mismatch(self.n, rhs.n, "Matrix::matmul"));
        }
        let mut c = Matrix::try_zeros(self.n)?;
        blocked_matmul(self, rhs, &mut c);
        Ok(c)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Complex64;

    #[inline(always)]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(
            i < self.n && j < self.n,
            "index ({i}, {j}) out of bounds for {n}x{n} matrix",
            n = self.n
        );
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        assert!(
            i < self.n && j < self.n,
            "index ({i}, {j}) out of bounds for {n}x{n} matrix",
            n = self.n
        );
        &mut self.data[i * self.n + j]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}x{} [", self.n, self.n)?;
        for row in self.data.chunks(self.n.max(1)) {
            write!(f, "  ")?;
            for value in row {
                write!(f, "{value:.4} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "]")
    }
}
