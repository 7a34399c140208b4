//! # Cache-Blocked Complex Matrix Multiplication
//!
//! This module computes `C = A · B` for square, row-major matrices of [`Complex64`].
//! It improves on the naive triple loop through:
//!
//! 1. **Tiling**: `C` is partitioned into `BS × BS` tiles along `i` and `j`, and the
//!    reduction dimension `k` is walked in chunks of `BS` so the rows of `A` and `B`
//!    touched per tile stay cache resident.
//! 2. **Register-Level Accumulation**: each tile sums into an `AccumulationBlock` on
//!    the worker's stack and is written to `C` once, after its last `k` chunk.
//! 3. **Unrolled Row Groups**: rows are processed [`UNROLL`] at a time so every
//!    broadcast `B(k, j)` is reused across several rows of `A`.
//! 4. **Lane-Parallel Arithmetic**: the row-group multiply-accumulate runs on the best
//!    [`Backend`] for the CPU (see [`crate::simd`]).
//! 5. **Tile Parallelism**: tiles are independent and are handed to Rayon one task per
//!    tile, so idle workers steal the remaining tiles.
//!
//! Every axis is clipped to the matrix edge, so dimensions that are not multiples of
//! `BS` or `UNROLL` go through the same code path with narrower bounds.
//!
//! The accumulation order for a cell is fixed by the dimension alone (`k` ascending),
//! so repeated calls, schedules and backends all produce identical bits.

use std::cmp::min;

use num::complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use crate::matrix::{element_count, Matrix};
use crate::simd::scalar::Scalar;
use crate::simd::{Backend, ComplexMac};
use crate::{BLOCK_SIZE, UNROLL};

#[cfg(all(avx, any(target_arch = "x86", target_arch = "x86_64")))]
use crate::simd::avx::Avx;

#[cfg(all(neon, target_arch = "aarch64"))]
use crate::simd::neon::Neon;

/// How tiles are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// Tiles in index order on the calling thread.
    Sequential,
    /// One Rayon task per tile on the current thread pool.
    #[default]
    Parallel,
}

/// Runtime knobs of the blocked kernel. The tile side is a const parameter of
/// [`blocked_matmul_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelOptions {
    pub backend: Backend,
    pub schedule: Schedule,
}

impl KernelOptions {
    pub fn sequential() -> Self {
        KernelOptions {
            schedule: Schedule::Sequential,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// Largest tile side accepted by [`blocked_matmul_with`].
///
/// Each tile's accumulation block takes `16 · BS²` bytes on the worker's stack, and
/// Rayon workers get 2 MiB by default. At this size the block is 256 KiB.
pub const MAX_BLOCK_SIZE: usize = 128;

/// Per-tile scratch holding partial sums of one `BS × BS` tile of `C`.
///
/// `cells[r][j]` accumulates `C(ii + r, jj + j)`. The block always has full tile size;
/// on clipped boundary tiles the unused cells stay zero and are never written back.
/// The 32-byte alignment matches the width of an AVX register.
#[repr(C, align(32))]
pub(crate) struct AccumulationBlock<const BS: usize> {
    pub(crate) cells: [[Complex64; BS]; BS],
}

impl<const BS: usize> AccumulationBlock<BS> {
    /// Rejects tile sizes whose block would not fit on a Rayon worker stack.
    const SIZE_OK: () = assert!(
        BS > 0 && BS <= MAX_BLOCK_SIZE,
        "tile size must be in 1..=MAX_BLOCK_SIZE"
    );

    #[inline(always)]
    pub(crate) fn zeroed() -> Self {
        let () = Self::SIZE_OK;
        AccumulationBlock {
            cells: [[Complex64::new(0.0, 0.0); BS]; BS],
        }
    }
}

/// Exclusive view of one tile of `C`: its origin and its clipped row segments.
///
/// Row segments come from `chunks_mut`, so no two tiles can ever overlap.
struct TileMut<'c> {
    ii: usize,
    jj: usize,
    rows: Vec<&'c mut [Complex64]>,
}

/// Splits a row-major `n × n` buffer into `ceil(n / BS)²` disjoint tiles.
fn split_tiles<const BS: usize>(c: &mut [Complex64], n: usize) -> Vec<TileMut<'_>> {
    let tiles_per_side = n.div_ceil(BS);
    let tile_height = min(BS, n);

    let mut tiles: Vec<TileMut<'_>> = (0..tiles_per_side * tiles_per_side)
        .map(|t| TileMut {
            ii: (t / tiles_per_side) * BS,
            jj: (t % tiles_per_side) * BS,
            rows: Vec::with_capacity(tile_height),
        })
        .collect();

    for (i, row) in c.chunks_mut(n).enumerate() {
        let tile_row = (i / BS) * tiles_per_side;
        for (tj, segment) in row.chunks_mut(BS).enumerate() {
            tiles[tile_row + tj].rows.push(segment);
        }
    }

    tiles
}

/// Computes one tile of `C` from all `k` chunks and writes it back.
///
/// # Safety
///
/// The CPU must support backend `K`.
unsafe fn compute_tile<K: ComplexMac, const BS: usize>(
    a: &[Complex64],
    b: &[Complex64],
    n: usize,
    tile: TileMut<'_>,
) {
    let TileMut { ii, jj, rows } = tile;
    let height = rows.len();
    let width = rows.first().map_or(0, |row| row.len());
    let j_end = jj + width;

    let mut block = AccumulationBlock::<BS>::zeroed();
    let acc = &mut block.cells[..height];
    let mut a_group = [Complex64::new(0.0, 0.0); UNROLL];

    for kk in (0..n).step_by(BS) {
        let k_end = min(kk + BS, n);

        for k in kk..k_end {
            let b_row = &b[k * n + jj..k * n + j_end];

            for (g, acc_group) in acc.chunks_mut(UNROLL).enumerate() {
                // acc_group is already clipped to the tile's last row
                let i = ii + g * UNROLL;
                let group_rows = acc_group.len();
                for (r, slot) in a_group[..group_rows].iter_mut().enumerate() {
                    *slot = a[(i + r) * n + k];
                }

                K::mac_row_group::<BS>(&a_group[..group_rows], b_row, acc_group);
            }
        }
    }

    for (dst, src) in rows.into_iter().zip(acc.iter()) {
        dst.copy_from_slice(&src[..width]);
    }
}

/// # Safety
///
/// The CPU must support backend `K`.
unsafe fn run_tiles<K: ComplexMac, const BS: usize>(
    a: &[Complex64],
    b: &[Complex64],
    c: &mut [Complex64],
    n: usize,
    schedule: Schedule,
) {
    let tiles = split_tiles::<BS>(c, n);

    match schedule {
        Schedule::Sequential => {
            for tile in tiles {
                compute_tile::<K, BS>(a, b, n, tile);
            }
        }
        Schedule::Parallel => {
            tiles
                .into_par_iter()
                .with_max_len(1)
                .for_each(|tile| unsafe { compute_tile::<K, BS>(a, b, n, tile) });
        }
    }
}

/// Computes `C = A · B` with [`BLOCK_SIZE`] tiles, the best backend and Rayon.
///
/// Every entry of `c` is overwritten; its previous contents are irrelevant.
///
/// # Panics
///
/// Panics if the three matrices do not share the same dimension.
pub fn blocked_matmul(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    assert_eq!(a.dim(), b.dim(), "Matrices A and B have different dimensions");
    assert_eq!(a.dim(), c.dim(), "Matrix C has incorrect dimensions");

    let n = a.dim();
    blocked_matmul_with::<BLOCK_SIZE>(
        a.as_slice(),
        b.as_slice(),
        c.as_mut_slice(),
        n,
        KernelOptions::default(),
    );
}

/// Slice form of [`blocked_matmul`] for row-major `n × n` buffers.
///
/// # Panics
///
/// Panics if any slice length differs from `n * n`.
pub fn blocked_matmul_slices(a: &[Complex64], b: &[Complex64], c: &mut [Complex64], n: usize) {
    blocked_matmul_with::<BLOCK_SIZE>(a, b, c, n, KernelOptions::default());
}

/// Blocked multiplication with tile side `BS` and explicit [`KernelOptions`].
///
/// # Arguments
/// * `a` - Matrix A (n×n) in row-major order
/// * `b` - Matrix B (n×n) in row-major order
/// * `c` - Matrix C (n×n) in row-major order, fully overwritten
/// * `n` - Dimension of all three matrices
/// * `options` - Backend and tile schedule
///
/// # Panics
///
/// Panics if any slice length differs from `n * n`. A tile size outside
/// `1..=MAX_BLOCK_SIZE` is rejected at compile time.
pub fn blocked_matmul_with<const BS: usize>(
    a: &[Complex64],
    b: &[Complex64],
    c: &mut [Complex64],
    n: usize,
    options: KernelOptions,
) {
    let len = element_count(n);
    assert_eq!(Some(a.len()), len, "Matrix A has incorrect dimensions");
    assert_eq!(Some(b.len()), len, "Matrix B has incorrect dimensions");
    assert_eq!(Some(c.len()), len, "Matrix C has incorrect dimensions");

    if n == 0 {
        return;
    }

    let backend = options.backend.resolve();
    debug!(
        n,
        block_size = BS,
        tiles = n.div_ceil(BS).pow(2),
        %backend,
        schedule = ?options.schedule,
        "blocked complex matmul"
    );

    // SAFETY: `resolve` only returns backends the running CPU supports.
    unsafe {
        match backend {
            #[cfg(all(avx, any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Avx => run_tiles::<Avx, BS>(a, b, c, n, options.schedule),
            #[cfg(all(neon, target_arch = "aarch64"))]
            Backend::Neon => run_tiles::<Neon, BS>(a, b, c, n, options.schedule),
            _ => run_tiles::<Scalar, BS>(a, b, c, n, options.schedule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive::naive_matmul_slices;

    fn c64(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    /// Deterministic, non-trivial test values: entry (i, j) of matrix `tag`.
    fn create_test_matrix(n: usize, tag: f64) -> Vec<Complex64> {
        (0..n * n)
            .map(|idx| {
                let (i, j) = ((idx / n) as f64, (idx % n) as f64);
                c64((i + 1.0) * 0.5 - j * 0.25 + tag, (i * j * 0.1 + tag).sin())
            })
            .collect()
    }

    fn assert_close(actual: &[Complex64], expected: &[Complex64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (idx, (x, y)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (x - y).norm() <= tol,
                "Mismatch at index {idx}: blocked={x}, naive={y}"
            );
        }
    }

    fn check_against_naive<const BS: usize>(n: usize, options: KernelOptions) {
        let a = create_test_matrix(n, 0.3);
        let b = create_test_matrix(n, -1.1);
        let mut expected = vec![c64(0.0, 0.0); n * n];
        let mut actual = vec![c64(f64::NAN, f64::NAN); n * n];

        naive_matmul_slices(&a, &b, &mut expected, n);
        blocked_matmul_with::<BS>(&a, &b, &mut actual, n, options);

        assert_close(&actual, &expected, 1e-9 * n as f64);
    }

    mod tiling_tests {
        use super::*;

        #[test]
        fn test_split_tiles_covers_every_cell_once() {
            let n = 10;
            let mut c: Vec<Complex64> = (0..n * n).map(|x| c64(x as f64, 0.0)).collect();
            let tiles = split_tiles::<4>(&mut c, n);
            assert_eq!(tiles.len(), 9);

            let mut seen = vec![0u8; n * n];
            for tile in &tiles {
                for (r, row) in tile.rows.iter().enumerate() {
                    for (j, value) in row.iter().enumerate() {
                        let idx = (tile.ii + r) * n + tile.jj + j;
                        assert_eq!(value.re as usize, idx);
                        seen[idx] += 1;
                    }
                }
            }
            assert!(seen.iter().all(|&count| count == 1));
        }

        #[test]
        fn test_split_tiles_clips_boundary() {
            let n = 10;
            let mut c = vec![c64(0.0, 0.0); n * n];
            let tiles = split_tiles::<4>(&mut c, n);

            let corner = tiles.last().unwrap();
            assert_eq!((corner.ii, corner.jj), (8, 8));
            assert_eq!(corner.rows.len(), 2);
            assert!(corner.rows.iter().all(|row| row.len() == 2));

            let first = &tiles[0];
            assert_eq!(first.rows.len(), 4);
            assert!(first.rows.iter().all(|row| row.len() == 4));
        }

        #[test]
        fn test_single_tile_when_block_exceeds_matrix() {
            let n = 3;
            let mut c = vec![c64(0.0, 0.0); n * n];
            let tiles = split_tiles::<64>(&mut c, n);
            assert_eq!(tiles.len(), 1);
            assert_eq!(tiles[0].rows.len(), 3);
        }
    }

    mod kernel_tests {
        use super::*;

        #[test]
        fn test_matmul_2x2_scenario() {
            // A = | 1+i   0  |   B = | 1  2+i |   C = | 1+i  1+3i |
            //     |  0   1-i |       | 3   4  |       | 3-3i 4-4i |
            // (1+i)(2+i) = 2 + 3i + i² = 1+3i
            let a = vec![c64(1.0, 1.0), c64(0.0, 0.0), c64(0.0, 0.0), c64(1.0, -1.0)];
            let b = vec![c64(1.0, 0.0), c64(2.0, 1.0), c64(3.0, 0.0), c64(4.0, 0.0)];
            let mut c = vec![c64(9.0, 9.0); 4];

            blocked_matmul_slices(&a, &b, &mut c, 2);

            let expected = [c64(1.0, 1.0), c64(1.0, 3.0), c64(3.0, -3.0), c64(4.0, -4.0)];
            assert_eq!(c, expected);
        }

        #[test]
        fn test_small_tiles_against_naive() {
            for n in [1, 3, 4, 5, 9, 17] {
                check_against_naive::<4>(n, KernelOptions::default());
                check_against_naive::<5>(n, KernelOptions::default());
                check_against_naive::<8>(n, KernelOptions::sequential());
            }
        }

        #[test]
        fn test_unroll_remainders() {
            // Tile heights 1..=UNROLL+1 inside a single tile
            for n in 1..=UNROLL + 1 {
                check_against_naive::<BLOCK_SIZE>(n, KernelOptions::default());
            }
        }

        #[test]
        fn test_scalar_backend_against_naive() {
            let options = KernelOptions::default().with_backend(Backend::Scalar);
            check_against_naive::<8>(19, options);
        }

        #[test]
        fn test_backends_bit_identical() {
            let n = 23;
            let a = create_test_matrix(n, 0.7);
            let b = create_test_matrix(n, 0.2);
            let mut scalar = vec![c64(0.0, 0.0); n * n];
            let mut detected = vec![c64(0.0, 0.0); n * n];

            blocked_matmul_with::<8>(
                &a,
                &b,
                &mut scalar,
                n,
                KernelOptions::default().with_backend(Backend::Scalar),
            );
            blocked_matmul_with::<8>(
                &a,
                &b,
                &mut detected,
                n,
                KernelOptions::default().with_backend(Backend::detect()),
            );

            assert_eq!(scalar, detected);
        }

        #[test]
        fn test_overwrites_previous_contents() {
            let n = 6;
            let a = create_test_matrix(n, 0.0);
            let b = create_test_matrix(n, 1.0);
            let mut fresh = vec![c64(0.0, 0.0); n * n];
            let mut dirty = vec![c64(1e300, -1e300); n * n];

            blocked_matmul_with::<4>(&a, &b, &mut fresh, n, KernelOptions::default());
            blocked_matmul_with::<4>(&a, &b, &mut dirty, n, KernelOptions::default());

            assert_eq!(fresh, dirty);
        }

        #[test]
        fn test_largest_tile_fits_worker_stack() {
            assert_eq!(
                std::mem::size_of::<AccumulationBlock<MAX_BLOCK_SIZE>>(),
                16 * MAX_BLOCK_SIZE * MAX_BLOCK_SIZE
            );
            assert!(std::mem::size_of::<AccumulationBlock<MAX_BLOCK_SIZE>>() <= 512 * 1024);

            // Runs on Rayon workers with their default stack
            check_against_naive::<MAX_BLOCK_SIZE>(MAX_BLOCK_SIZE + 3, KernelOptions::default());
        }

        #[test]
        fn test_empty_matrix_is_noop() {
            let mut c: Vec<Complex64> = Vec::new();
            blocked_matmul_slices(&[], &[], &mut c, 0);
            assert!(c.is_empty());
        }

        #[test]
        #[should_panic(expected = "Matrix B has incorrect dimensions")]
        fn test_mismatched_slice_panics() {
            let a = vec![c64(0.0, 0.0); 4];
            let b = vec![c64(0.0, 0.0); 3];
            let mut c = vec![c64(0.0, 0.0); 4];
            blocked_matmul_slices(&a, &b, &mut c, 2);
        }

        #[test]
        #[should_panic(expected = "Matrix C has incorrect dimensions")]
        fn test_mismatched_matrix_panics() {
            let a = Matrix::zeros(3);
            let b = Matrix::zeros(3);
            let mut c = Matrix::zeros(4);
            blocked_matmul(&a, &b, &mut c);
        }
    }
}
