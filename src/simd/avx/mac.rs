use num::complex::Complex64;

use crate::simd::avx::c64x2::{broadcast, C64x2, LANE_COUNT};
use crate::simd::scalar::mac;
use crate::simd::traits::ComplexMac;
use crate::UNROLL;

/// AVX complex multiply-accumulate backend.
///
/// Rows of a group are paired into [`C64x2`] registers: rows 0-1 and rows 2-3. The two
/// accumulation cells of a pair live in different rows of the block, so they are loaded
/// and stored as split 128-bit halves. A group with an odd number of rows finishes its
/// last row with the scalar formula, which rounds identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avx;

impl ComplexMac for Avx {
    #[inline(always)]
    unsafe fn mac_row_group<const BS: usize>(
        a: &[Complex64],
        b_row: &[Complex64],
        acc: &mut [[Complex64; BS]],
    ) {
        mac_row_group_avx::<BS>(a, b_row, acc)
    }
}

#[target_feature(enable = "avx")]
unsafe fn mac_row_group_avx<const BS: usize>(
    a: &[Complex64],
    b_row: &[Complex64],
    acc: &mut [[Complex64; BS]],
) {
    debug_assert_eq!(a.len(), acc.len());
    debug_assert!(a.len() <= UNROLL);
    debug_assert!(b_row.len() <= BS);

    let rows = a.len();
    let pairs = rows / LANE_COUNT;

    // A(i, k) for the whole group, loaded once and reused for every column
    let mut a_pairs = [C64x2::zeros(); UNROLL / LANE_COUNT];
    for (p, slot) in a_pairs.iter_mut().enumerate().take(pairs) {
        *slot = C64x2::from_pair(a[2 * p], a[2 * p + 1]);
    }

    // Cell (r, j) of the group is at cells.add(r * BS + j)
    let cells = acc.as_mut_ptr() as *mut Complex64;

    for (j, &b) in b_row.iter().enumerate() {
        let (b_re, b_im) = broadcast(b);

        for (p, a_pair) in a_pairs.iter().enumerate().take(pairs) {
            let lo = cells.add(2 * p * BS + j);
            let hi = cells.add((2 * p + 1) * BS + j);
            let sum = C64x2::load_split(lo, hi).add(a_pair.mul_broadcast(b_re, b_im));
            sum.store_split(lo, hi);
        }

        if rows % LANE_COUNT == 1 {
            mac(&mut *cells.add((rows - 1) * BS + j), a[rows - 1], b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar::Scalar;

    fn sample(seed: usize) -> Complex64 {
        let x = seed as f64;
        Complex64::new((x * 0.37).sin() * 3.0, (x * 1.13).cos() - 0.5)
    }

    #[test]
    fn test_every_group_height_matches_scalar() {
        if !std::arch::is_x86_feature_detected!("avx") {
            return;
        }
        const BS: usize = 8;
        let b_row: Vec<Complex64> = (0..6).map(|j| sample(100 + j)).collect();

        for rows in 1..=UNROLL {
            let a: Vec<Complex64> = (0..rows).map(sample).collect();
            let start: Vec<[Complex64; BS]> = (0..rows)
                .map(|r| std::array::from_fn(|j| sample(50 + r * BS + j)))
                .collect();

            let mut expected = start.clone();
            let mut actual = start.clone();
            unsafe {
                Scalar::mac_row_group::<BS>(&a, &b_row, &mut expected);
                Avx::mac_row_group::<BS>(&a, &b_row, &mut actual);
            }

            assert_eq!(actual, expected, "mismatch for a group of {rows} rows");
            // Columns past the clipped B row keep their initial values
            for (row, init) in actual.iter().zip(&start) {
                assert_eq!(row[6..], init[6..]);
            }
        }
    }
}
