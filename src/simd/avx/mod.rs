//! AVX implementations for 256-bit complex double arithmetic.
//!
//! A 256-bit register holds two interleaved [`Complex64`](num::complex::Complex64)
//! values, `[re0, im0, re1, im1]`. The kernel pairs consecutive unrolled rows into
//! one register and broadcasts `B(k, j)` as separate real and imaginary splats.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: Intel Sandy Bridge (2011+) or AMD Bulldozer (2011+)
//! - **Target Architecture**: x86 or x86_64
//! - **Runtime Detection**: functions are compiled with `#[target_feature(enable = "avx")]`
//!   and only reached after `is_x86_feature_detected!("avx")` succeeds
//!
//! Only `mul`, `addsub` and `add` are used, never FMA, so results are bit-identical to
//! the scalar backend.

pub mod c64x2;

pub mod mac;

pub use mac::Avx;
