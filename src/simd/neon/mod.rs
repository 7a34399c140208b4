//! NEON implementation for 128-bit complex double arithmetic on aarch64.
//!
//! A `float64x2_t` holds exactly one interleaved [`Complex64`](num::complex::Complex64),
//! so each unrolled row of a group gets its own register while `B(k, j)` is broadcast
//! once per column. NEON is mandatory on aarch64, so no runtime detection is needed.

pub mod c64x1;

pub mod mac;

pub use mac::Neon;
