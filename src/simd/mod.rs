//! Lane backends for the complex multiply-accumulate inner loop.
//!
//! Every backend implements [`ComplexMac`]: given the `A(i, k)` values of one row group
//! (at most [`UNROLL`](crate::UNROLL) rows) and a clipped row segment of `B`, it adds
//! `A(i, k) · B(k, j)` into the matching accumulation cells.
//!
//! # Memory layout requirement
//!
//! The vector backends reinterpret a [`Complex64`] as two contiguous `f64` values,
//! real part first (interleaved real/imaginary). `num::complex::Complex64` is declared
//! `#[repr(C)]` with fields `re, im`, and the assertions below pin the size and alignment
//! the vector loads rely on. Any change to the element type must keep this layout.
//!
//! # Backend selection
//!
//! `build.rs` emits one of `cfg(avx)`, `cfg(neon)` or `cfg(fallback)`. Vector modules are
//! only compiled under their cfg, and [`Backend::Avx`] additionally requires runtime
//! detection to succeed. [`Backend::Scalar`] is always available and computes the same
//! bits as the vector backends.

use std::fmt;
use std::str::FromStr;

use num::complex::Complex64;
use tracing::warn;

#[cfg(all(avx, any(target_arch = "x86", target_arch = "x86_64")))]
pub mod avx;

#[cfg(all(neon, target_arch = "aarch64"))]
pub mod neon;

pub mod scalar;

pub mod traits;

pub use traits::ComplexMac;

const _: () = assert!(std::mem::size_of::<Complex64>() == 2 * std::mem::size_of::<f64>());
const _: () = assert!(std::mem::align_of::<Complex64>() == std::mem::align_of::<f64>());

/// Instruction set used for the inner multiply-accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Best backend available on the running CPU.
    #[default]
    Auto,
    /// Portable scalar arithmetic.
    Scalar,
    /// 256-bit AVX, two complex values per register.
    Avx,
    /// 128-bit NEON, one complex value per register.
    Neon,
}

impl Backend {
    /// Returns the best backend the running CPU supports.
    pub fn detect() -> Backend {
        if Backend::Avx.is_available() {
            Backend::Avx
        } else if Backend::Neon.is_available() {
            Backend::Neon
        } else {
            Backend::Scalar
        }
    }

    /// Whether this backend was compiled in and can run on this CPU.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Auto | Backend::Scalar => true,
            Backend::Avx => avx_available(),
            Backend::Neon => cfg!(all(neon, target_arch = "aarch64")),
        }
    }

    /// Maps `Auto` to a concrete backend and demotes unavailable requests to `Scalar`.
    ///
    /// The result is never `Auto`, and is always safe to run on this CPU.
    pub fn resolve(self) -> Backend {
        match self {
            Backend::Auto => Backend::detect(),
            requested if requested.is_available() => requested,
            requested => {
                warn!(?requested, "backend not available on this CPU, using scalar");
                Backend::Scalar
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Scalar => "scalar",
            Backend::Avx => "avx",
            Backend::Neon => "neon",
        }
    }
}

#[cfg(all(avx, any(target_arch = "x86", target_arch = "x86_64")))]
fn avx_available() -> bool {
    std::arch::is_x86_feature_detected!("avx")
}

#[cfg(not(all(avx, any(target_arch = "x86", target_arch = "x86_64"))))]
fn avx_available() -> bool {
    false
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "scalar" => Ok(Backend::Scalar),
            "avx" => Ok(Backend::Avx),
            "neon" => Ok(Backend::Neon),
            other => Err(format!(
                "unknown backend '{other}' (expected auto, scalar, avx or neon)"
            )),
        }
    }
}
