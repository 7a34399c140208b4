use num::complex::Complex64;

use crate::simd::neon::c64x1::{broadcast, C64x1};
use crate::simd::traits::ComplexMac;
use crate::UNROLL;

/// NEON complex multiply-accumulate backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neon;

impl ComplexMac for Neon {
    #[inline(always)]
    unsafe fn mac_row_group<const BS: usize>(
        a: &[Complex64],
        b_row: &[Complex64],
        acc: &mut [[Complex64; BS]],
    ) {
        debug_assert_eq!(a.len(), acc.len());
        debug_assert!(a.len() <= UNROLL);
        debug_assert!(b_row.len() <= BS);

        let rows = a.len();
        let mut a_regs = [C64x1::from_complex(Complex64::new(0.0, 0.0)); UNROLL];
        for (slot, &value) in a_regs.iter_mut().zip(a) {
            *slot = C64x1::from_complex(value);
        }

        let cells = acc.as_mut_ptr() as *mut Complex64;

        for (j, &b) in b_row.iter().enumerate() {
            let (b_re, b_im) = broadcast(b);
            for (r, a_reg) in a_regs.iter().enumerate().take(rows) {
                let cell = cells.add(r * BS + j);
                C64x1::load(cell)
                    .add(a_reg.mul_broadcast(b_re, b_im))
                    .store(cell);
            }
        }
    }
}
