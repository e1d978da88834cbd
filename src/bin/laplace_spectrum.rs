//! Computes part of the spectrum of a 3D Dirichlet Laplacian and compares it with the
//! analytic eigenvalues.
//!
//! The problem is assembled with [`partial_hevp::utils::laplacian::lap3d`] in the requested
//! element kind and solved in shift-invert mode around `--sigma`, or with a Jacobi
//! preconditioner when `--jacobi` is given. Each computed eigenvalue is logged next to the
//! analytic one, and the table can optionally be written to a CSV file.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use faer::{c32, c64};
use partial_hevp::{
    Element, JacobiPreconditioner, PartialEigen, PartialEigenproblem, Preconditioner,
    element::RealScalar,
    utils::laplacian::{lap3d, lap3d_eigenvalues},
};
use serde::Serialize;
use std::path::PathBuf;

/// Element kind of the assembled problem.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Dtype {
    F32,
    F64,
    C32,
    C64,
}

#[derive(Parser, Debug)]
#[clap(
    name = "laplace-spectrum",
    about = "Computes eigenvalues of a 3D Laplacian and checks them against the analytic spectrum."
)]
struct Args {
    /// Interior grid points along x.
    #[clap(long, default_value_t = 10)]
    nx: usize,
    /// Interior grid points along y.
    #[clap(long, default_value_t = 10)]
    ny: usize,
    /// Interior grid points along z.
    #[clap(long, default_value_t = 10)]
    nz: usize,
    /// Edge length of the cubic domain.
    #[clap(long, default_value_t = 1.0)]
    extent: f64,
    /// Number of eigenvalues to compute.
    #[clap(long, default_value_t = 10)]
    nev: usize,
    /// Shift around which eigenvalues are sought.
    #[clap(long, default_value_t = 0.0)]
    sigma: f64,
    /// Eigenvector error tolerance.
    #[clap(long, default_value_t = 0.0)]
    tol: f64,
    /// Solver verbosity (-1 silent, 0 errors, 1 progress, 2 iterates).
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    verb: i32,
    #[clap(long, value_enum, default_value_t = Dtype::F64)]
    dtype: Dtype,
    /// Use a Jacobi preconditioner instead of shift-invert.
    #[clap(long)]
    jacobi: bool,
    /// Optional CSV file for the computed and analytic eigenvalues.
    #[clap(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// A single row of the output CSV.
#[derive(Debug, Serialize)]
struct SpectrumRow {
    index: usize,
    computed: f64,
    analytic: f64,
    relative_error: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verb >= 2 {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    log::info!(
        "Laplacian {}x{}x{} on [0, {}]^3, dtype {:?}",
        args.nx,
        args.ny,
        args.nz,
        args.extent,
        args.dtype
    );

    let computed = match args.dtype {
        Dtype::F32 => run::<f32>(&args)?,
        Dtype::F64 => run::<f64>(&args)?,
        Dtype::C32 => run::<c32>(&args)?,
        Dtype::C64 => run::<c64>(&args)?,
    };

    let analytic = lap3d_eigenvalues(
        args.nx,
        args.ny,
        args.nz,
        args.extent,
        args.extent,
        args.extent,
    );
    let rows = compare(&computed, &analytic, args.sigma, args.jacobi);
    for row in &rows {
        log::info!(
            "{:4}  {:>20.12e}  {:>20.12e}  {:.2e}",
            row.index,
            row.computed,
            row.analytic,
            row.relative_error
        );
    }

    if let Some(path) = &args.output {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV writer for {path:?}"))?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        log::info!("Results written to {path:?}");
    }
    Ok(())
}

/// Solves the problem in element kind `T` and returns the eigenvalues as `f64`.
fn run<T: Element>(args: &Args) -> Result<Vec<f64>> {
    let a = lap3d::<T>(
        args.nx,
        args.ny,
        args.nz,
        args.extent,
        args.extent,
        args.extent,
    )
    .context("Failed to assemble the Laplacian")?;

    let jacobi = if args.jacobi {
        Some(JacobiPreconditioner::new(&a)?)
    } else {
        None
    };

    let mut problem = PartialEigenproblem::new(&a)
        .sigma(<T::Real as RealScalar>::from_f64(args.sigma))
        .which(args.nev)
        .tol(<T::Real as RealScalar>::from_f64(args.tol))
        .verbosity(args.verb);
    if let Some(jacobi) = &jacobi {
        problem = problem.preconditioner(jacobi as &dyn Preconditioner<T>);
    }

    let result: PartialEigen<T> = problem.solve().context("Eigenvalue solve failed")?;
    if !result.status.is_success() {
        log::warn!(
            "Solver returned status {} ({}); {} eigenpairs available",
            result.status.code(),
            result.status,
            result.len()
        );
    }
    Ok(result.eigenvalues.iter().map(|&v| v.into()).collect())
}

/// Pairs computed eigenvalues with the analytic ones they approximate.
///
/// Preconditioned solves return the smallest eigenvalues; shift-invert solves return the
/// ones nearest to `sigma`, which form a contiguous run of the sorted analytic spectrum.
fn compare(computed: &[f64], analytic: &[f64], sigma: f64, smallest: bool) -> Vec<SpectrumRow> {
    let start = if smallest || computed.is_empty() {
        0
    } else {
        let first = computed[0];
        analytic
            .iter()
            .enumerate()
            .min_by(|(_, x), (_, y)| (*x - first).abs().total_cmp(&(*y - first).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    log::debug!("Matching computed eigenvalues from analytic index {start} (sigma = {sigma})");

    computed
        .iter()
        .zip(&analytic[start.min(analytic.len())..])
        .enumerate()
        .map(|(index, (&computed, &analytic))| SpectrumRow {
            index,
            computed,
            analytic,
            relative_error: (computed - analytic).abs() / analytic.abs().max(f64::MIN_POSITIVE),
        })
        .collect()
}
