use num::complex::Complex64;

/// Row-group complex multiply-accumulate, the innermost step of the blocked kernel.
///
/// For every column `j` of `b_row` and every row `r` of the group:
///
/// ```text
/// acc[r][j].re += a[r].re * b_row[j].re - a[r].im * b_row[j].im
/// acc[r][j].im += a[r].re * b_row[j].im + a[r].im * b_row[j].re
/// ```
///
/// The product term is rounded before it is accumulated and no fused multiply-add is
/// used, so every implementation produces the same bits.
pub trait ComplexMac {
    /// Accumulates `a[r] · b_row[j]` into `acc[r][j]`.
    ///
    /// `a` holds only the rows present in the group (`a.len() == acc.len()`,
    /// at most [`UNROLL`](crate::UNROLL)), and `b_row.len() <= BS`. Columns of `acc`
    /// beyond `b_row.len()` are not touched.
    ///
    /// # Safety
    ///
    /// The running CPU must support the instruction set of the implementing backend
    /// (see [`Backend::is_available`](crate::simd::Backend::is_available)).
    unsafe fn mac_row_group<const BS: usize>(
        a: &[Complex64],
        b_row: &[Complex64],
        acc: &mut [[Complex64; BS]],
    );
}
