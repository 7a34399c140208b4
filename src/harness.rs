//! Timing and reporting for the multiplication methods.
//!
//! The harness runs every method on the same inputs, resets `C` between runs, and
//! reports wall-clock seconds and MFLOPS using the complex multiply-accumulate
//! convention of `8 · n³` floating-point operations.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::info;

use crate::blocked::{blocked_matmul_with, KernelOptions};
use crate::error::Result;
use crate::generate::par_random_matrix;
use crate::matrix::Matrix;
use crate::naive::par_naive_matmul;
use crate::reference::reference_matmul;
use crate::simd::Backend;
use crate::BLOCK_SIZE;

/// Floating-point operations for one `n × n` complex product.
pub fn flop_count(n: usize) -> f64 {
    8.0 * (n as f64).powi(3)
}

/// Shortest duration credited to a run, so a zero reading from a coarse clock still
/// gives a finite rate.
const MIN_SECONDS: f64 = 1e-9;

/// Throughput in MFLOPS for an `n × n` product that took `seconds`.
pub fn mflops(n: usize, seconds: f64) -> f64 {
    flop_count(n) / seconds.max(MIN_SECONDS) * 1e-6
}

/// The multiplication methods the harness compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Row-parallel triple loop.
    Naive,
    /// `ndarray` dense product.
    Reference,
    /// Cache-blocked lane-parallel kernel.
    Blocked,
}

impl Method {
    pub fn label(self) -> &'static str {
        match self {
            Method::Naive => "Naive triple loop",
            Method::Reference => "Reference (ndarray)",
            Method::Blocked => "Blocked + vectorized",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub method: Method,
    pub seconds: f64,
    pub mflops: f64,
    /// Largest `|C - C_ref|` over all entries, once a reference result exists.
    pub max_error: Option<f64>,
}

/// Runs `method` on `a · b` into `c` and times it.
///
/// `c` is zeroed first so every method starts from the same state.
pub fn time_method(
    method: Method,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    options: KernelOptions,
) -> Result<Measurement> {
    c.fill_zero();
    let n = a.dim();

    let start = Instant::now();
    match method {
        Method::Naive => par_naive_matmul(a, b, c),
        Method::Reference => *c = reference_matmul(a, b)?,
        Method::Blocked => {
            blocked_matmul_with::<BLOCK_SIZE>(a.as_slice(), b.as_slice(), c.as_mut_slice(), n, options)
        }
    }
    let seconds = start.elapsed().as_secs_f64();

    let measurement = Measurement {
        method,
        seconds,
        mflops: mflops(n, seconds),
        max_error: None,
    };
    info!(
        method = method.label(),
        seconds = measurement.seconds,
        mflops = measurement.mflops,
        "method finished"
    );
    Ok(measurement)
}

/// Harness settings, normally filled from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub size: usize,
    pub seed: u64,
    pub skip_naive: bool,
    pub options: KernelOptions,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            size: 1024,
            seed: 42,
            skip_naive: false,
            options: KernelOptions::default(),
        }
    }
}

/// Results of one harness run.
#[derive(Debug, Clone)]
pub struct Report {
    pub size: usize,
    pub threads: usize,
    pub backend: Backend,
    pub started: DateTime<Local>,
    pub measurements: Vec<Measurement>,
}

impl Report {
    pub fn measurement(&self, method: Method) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.method == method)
    }

    /// Deviation of the blocked kernel from the reference result.
    pub fn blocked_error(&self) -> Option<f64> {
        self.measurement(Method::Blocked).and_then(|m| m.max_error)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Complex matrix multiplication {n}x{n} ({started})",
            n = self.size,
            started = self.started.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(
            f,
            "threads: {}, backend: {}, block: {}",
            self.threads, self.backend, BLOCK_SIZE
        )?;
        for (idx, m) in self.measurements.iter().enumerate() {
            write!(
                f,
                "\n{}. {}\n   Time: {:.4} s, Performance: {:.2} MFlops",
                idx + 1,
                m.method,
                m.seconds,
                m.mflops
            )?;
            if let Some(err) = m.max_error {
                write!(f, ", max |C - C_ref|: {err:.3e}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Generates `A` and `B`, then times naive, reference and blocked multiplication.
///
/// The naive and blocked results are compared against the reference product.
pub fn run(config: &HarnessConfig) -> Result<Report> {
    let n = config.size;
    let started = Local::now();

    info!(n, seed = config.seed, "generating random matrices");
    let a = par_random_matrix(n, config.seed);
    let b = par_random_matrix(n, config.seed.wrapping_add(1));
    let mut c = Matrix::try_zeros(n)?;

    let mut measurements = Vec::with_capacity(3);
    let mut naive_result = None;

    if !config.skip_naive {
        measurements.push(time_method(Method::Naive, &a, &b, &mut c, config.options)?);
        naive_result = Some(c.clone());
    }

    let mut reference = time_method(Method::Reference, &a, &b, &mut c, config.options)?;
    reference.max_error = Some(0.0);
    let c_ref = c.clone();

    if let (Some(naive), Some(result)) = (measurements.first_mut(), naive_result) {
        naive.max_error = Some(result.max_abs_diff(&c_ref)?);
    }
    measurements.push(reference);

    let mut blocked = time_method(Method::Blocked, &a, &b, &mut c, config.options)?;
    blocked.max_error = Some(c.max_abs_diff(&c_ref)?);
    measurements.push(blocked);

    Ok(Report {
        size: n,
        threads: rayon::current_num_threads(),
        backend: config.options.backend.resolve(),
        started,
        measurements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flop_count() {
        assert_eq!(flop_count(0), 0.0);
        assert_eq!(flop_count(1), 8.0);
        assert_eq!(flop_count(4096), 8.0 * 4096f64.powi(3));
    }

    #[test]
    fn test_mflops_guards_zero_time() {
        assert!(mflops(10, 0.0).is_finite());
        assert!(mflops(4096, 0.0).is_finite());
        assert!(mflops(4096, -1.0).is_finite());
        assert_eq!(mflops(10, 0.0), mflops(10, MIN_SECONDS));
        assert!((mflops(100, 1.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_method_produces_product() {
        let a = Matrix::identity(5);
        let b = Matrix::from_fn(5, |i, j| num::complex::Complex64::new(i as f64, j as f64));
        let mut c = Matrix::zeros(5);

        for method in [Method::Naive, Method::Reference, Method::Blocked] {
            let m = time_method(method, &a, &b, &mut c, KernelOptions::default()).unwrap();
            assert_eq!(m.method, method);
            assert!(m.seconds >= 0.0);
            assert!(c.max_abs_diff(&b).unwrap() < 1e-12, "{method} gave a wrong product");
        }
    }

    #[test]
    fn test_run_reports_all_methods() {
        let config = HarnessConfig {
            size: 37,
            seed: 3,
            ..Default::default()
        };
        let report = run(&config).unwrap();

        assert_eq!(report.measurements.len(), 3);
        assert_eq!(report.measurements[0].method, Method::Naive);
        assert_eq!(report.measurements[1].method, Method::Reference);
        assert_eq!(report.measurements[2].method, Method::Blocked);
        assert!(report.blocked_error().unwrap() < 1e-9 * 37.0);
        assert!(report.measurement(Method::Naive).unwrap().max_error.unwrap() < 1e-9 * 37.0);
        assert_ne!(report.backend, Backend::Auto);
    }

    #[test]
    fn test_run_can_skip_naive() {
        let config = HarnessConfig {
            size: 8,
            skip_naive: true,
            ..Default::default()
        };
        let report = run(&config).unwrap();
        assert!(report.measurement(Method::Naive).is_none());
        assert_eq!(report.measurements.len(), 2);
    }

    #[test]
    fn test_report_display() {
        let config = HarnessConfig {
            size: 4,
            ..Default::default()
        };
        let text = run(&config).unwrap().to_string();
        assert!(text.contains("Complex matrix multiplication 4x4"));
        assert!(text.contains("Naive triple loop"));
        assert!(text.contains("Reference (ndarray)"));
        assert!(text.contains("Blocked + vectorized"));
        assert!(text.contains("MFlops"));
    }
}
