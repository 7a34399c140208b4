use std::arch::aarch64::*;

use num::complex::Complex64;

/// One complex double in a `float64x2_t`, laid out `[re, im]`.
#[derive(Copy, Clone, Debug)]
pub struct C64x1 {
    pub elements: float64x2_t,
}

impl C64x1 {
    #[inline(always)]
    pub unsafe fn from_complex(value: Complex64) -> Self {
        C64x1 {
            elements: vld1q_f64(&value as *const Complex64 as *const f64),
        }
    }

    /// # Safety
    ///
    /// `ptr` must be valid for a 16-byte read.
    #[inline(always)]
    pub unsafe fn load(ptr: *const Complex64) -> Self {
        C64x1 {
            elements: vld1q_f64(ptr as *const f64),
        }
    }

    /// # Safety
    ///
    /// `ptr` must be valid for a 16-byte write.
    #[inline(always)]
    pub unsafe fn store(self, ptr: *mut Complex64) {
        vst1q_f64(ptr as *mut f64, self.elements);
    }

    /// Complex product with a broadcast scalar.
    ///
    /// `b_re` is `[b.re, b.re]` and `b_im_signed` is `[-b.im, b.im]`, which turns the
    /// swapped product into `[-(a.im*b.im), a.re*b.im]` so a single add finishes it.
    #[inline(always)]
    pub unsafe fn mul_broadcast(self, b_re: float64x2_t, b_im_signed: float64x2_t) -> Self {
        let swapped = vextq_f64::<1>(self.elements, self.elements);
        let direct = vmulq_f64(self.elements, b_re);
        let crossed = vmulq_f64(swapped, b_im_signed);
        C64x1 {
            elements: vaddq_f64(direct, crossed),
        }
    }

    #[inline(always)]
    pub unsafe fn add(self, rhs: Self) -> Self {
        C64x1 {
            elements: vaddq_f64(self.elements, rhs.elements),
        }
    }

    #[inline(always)]
    pub unsafe fn to_complex(self) -> Complex64 {
        let mut out = Complex64::new(0.0, 0.0);
        self.store(&mut out);
        out
    }
}

/// Builds the two splats consumed by [`C64x1::mul_broadcast`].
#[inline(always)]
pub unsafe fn broadcast(b: Complex64) -> (float64x2_t, float64x2_t) {
    let signed = [-b.im, b.im];
    (vdupq_n_f64(b.re), vld1q_f64(signed.as_ptr()))
}
