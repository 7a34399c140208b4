//! AVX 2-lane complex double vector.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use num::complex::Complex64;

/// Number of complex doubles in a 256-bit register.
pub(crate) const LANE_COUNT: usize = 2;

/// Two packed complex doubles in one `__m256d`, laid out `[re0, im0, re1, im1]`.
///
/// All constructors and operations are `unsafe` and compiled for AVX; the caller must
/// have checked that the CPU supports it.
#[derive(Copy, Clone, Debug)]
pub struct C64x2 {
    pub elements: __m256d,
}

impl C64x2 {
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn zeros() -> Self {
        C64x2 {
            elements: _mm256_setzero_pd(),
        }
    }

    /// Packs two values, `lo` in lanes 0-1 and `hi` in lanes 2-3.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn from_pair(lo: Complex64, hi: Complex64) -> Self {
        C64x2 {
            elements: _mm256_setr_pd(lo.re, lo.im, hi.re, hi.im),
        }
    }

    /// Loads two complex values from unrelated addresses.
    ///
    /// # Safety
    ///
    /// Both pointers must be valid for a 16-byte read.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn load_split(lo: *const Complex64, hi: *const Complex64) -> Self {
        C64x2 {
            elements: _mm256_loadu2_m128d(hi as *const f64, lo as *const f64),
        }
    }

    /// Stores lanes 0-1 to `lo` and lanes 2-3 to `hi`.
    ///
    /// # Safety
    ///
    /// Both pointers must be valid for a 16-byte write.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn store_split(self, lo: *mut Complex64, hi: *mut Complex64) {
        _mm256_storeu2_m128d(hi as *mut f64, lo as *mut f64, self.elements);
    }

    /// Lane-wise complex product with a broadcast scalar `b`.
    ///
    /// `b_re` and `b_im` hold `b.re` and `b.im` in all four lanes. The real lanes get
    /// `a.re*b.re - a.im*b.im` and the imaginary lanes `a.im*b.re + a.re*b.im`.
    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn mul_broadcast(self, b_re: __m256d, b_im: __m256d) -> Self {
        // [im0, re0, im1, re1]
        let swapped = _mm256_permute_pd::<0b0101>(self.elements);
        let direct = _mm256_mul_pd(self.elements, b_re);
        let crossed = _mm256_mul_pd(swapped, b_im);
        C64x2 {
            elements: _mm256_addsub_pd(direct, crossed),
        }
    }

    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn add(self, rhs: Self) -> Self {
        C64x2 {
            elements: _mm256_add_pd(self.elements, rhs.elements),
        }
    }

    #[inline]
    #[target_feature(enable = "avx")]
    pub unsafe fn to_array(self) -> [Complex64; LANE_COUNT] {
        let mut out = [Complex64::new(0.0, 0.0); LANE_COUNT];
        _mm256_storeu_pd(out.as_mut_ptr() as *mut f64, self.elements);
        out
    }
}

/// Broadcasts `b` into the real and imaginary splats used by [`C64x2::mul_broadcast`].
#[inline]
#[target_feature(enable = "avx")]
pub unsafe fn broadcast(b: Complex64) -> (__m256d, __m256d) {
    (_mm256_set1_pd(b.re), _mm256_set1_pd(b.im))
}
