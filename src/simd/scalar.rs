//! Portable scalar backend.

use num::complex::Complex64;

use crate::simd::traits::ComplexMac;
use crate::UNROLL;

/// Scalar complex multiply-accumulate backend, available on every target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

/// `acc += a · b` with the rounding sequence shared by all backends.
#[inline(always)]
pub fn mac(acc: &mut Complex64, a: Complex64, b: Complex64) {
    acc.re += a.re * b.re - a.im * b.im;
    acc.im += a.re * b.im + a.im * b.re;
}

impl ComplexMac for Scalar {
    #[inline(always)]
    unsafe fn mac_row_group<const BS: usize>(
        a: &[Complex64],
        b_row: &[Complex64],
        acc: &mut [[Complex64; BS]],
    ) {
        debug_assert_eq!(a.len(), acc.len());
        debug_assert!(a.len() <= UNROLL);
        debug_assert!(b_row.len() <= BS);

        for (j, &b) in b_row.iter().enumerate() {
            for (row, &a_val) in acc.iter_mut().zip(a) {
                mac(&mut row[j], a_val, b);
            }
        }
    }
}
