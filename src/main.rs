//! Benchmark harness for complex matrix multiplication.
//!
//! Generates two random `n × n` complex matrices and times the naive triple loop, the
//! `ndarray` reference product and the blocked kernel, reporting seconds, MFLOPS and the
//! largest deviation from the reference.
//!
//! ```bash
//! cmatmul --size 2048 --threads 8
//! CMATMUL_SIZE=512 RUST_LOG=debug cmatmul --skip-naive --backend scalar
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use cmatmul::harness::{self, HarnessConfig};
use cmatmul::{Backend, KernelOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Times naive, reference and blocked complex matrix multiplication
#[derive(Parser, Debug)]
#[command(name = "cmatmul")]
#[command(version)]
struct Args {
    /// Matrix dimension n
    #[arg(short = 'n', long, env = "CMATMUL_SIZE", default_value_t = 1024)]
    size: usize,

    /// Seed for the random input matrices
    #[arg(long, env = "CMATMUL_SEED", default_value_t = 42)]
    seed: u64,

    /// Worker threads (0 keeps the Rayon default of one per core)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Skip the naive triple loop, which dominates run time for large n
    #[arg(long)]
    skip_naive: bool,

    /// Kernel backend: auto, scalar, avx or neon
    #[arg(long, default_value_t = Backend::Auto)]
    backend: Backend,

    /// Largest accepted |C - C_ref| for the blocked kernel (default 1e-9 * n)
    #[arg(long)]
    tolerance: Option<f64>,
}

/// Log filter from `RUST_LOG`-style directives, `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure the Rayon thread pool")?;
    }

    if args.size > 4096 && !args.skip_naive {
        warn!(n = args.size, "naive multiplication at this size may take very long");
    }

    let config = HarnessConfig {
        size: args.size,
        seed: args.seed,
        skip_naive: args.skip_naive,
        options: KernelOptions::default().with_backend(args.backend),
    };

    info!(
        n = config.size,
        threads = rayon::current_num_threads(),
        backend = %config.options.backend.resolve(),
        "starting benchmark"
    );

    let report = harness::run(&config)
        .with_context(|| format!("Benchmark failed for n = {}", config.size))?;
    print!("{report}");

    let tolerance = args.tolerance.unwrap_or(1e-9 * args.size.max(1) as f64);
    if let Some(err) = report.blocked_error() {
        if err.is_nan() || err > tolerance {
            bail!("Blocked result deviates from the reference by {err:.3e} (tolerance {tolerance:.3e})");
        }
    }

    Ok(())
}
