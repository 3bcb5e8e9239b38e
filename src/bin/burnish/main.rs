//! Burnish CLI - surface fairing command-line tool.
//!
//! Usage: burnish <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `burnish --help` for available commands.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use burnish::algo::fair::{fair_with, FairOptions, SolverBackend};
use burnish::io;
use burnish::mesh::HalfEdgeMesh;

#[derive(Parser)]
#[command(name = "burnish")]
#[command(author, version, about = "Surface fairing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Fair a mesh (minimize a smoothness energy under boundary constraints)
    Fair {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Fairing order: 1 minimizes area, 2 curvature, higher values
        /// higher-order energies
        #[arg(short = 'k', long, default_value = "2")]
        order: u32,

        /// Solver backend
        #[arg(short, long, value_enum, default_value = "cg")]
        solver: Solver,

        /// Maximum solver iterations per coordinate axis (cg only)
        #[arg(long, default_value = "1000")]
        max_iterations: usize,

        /// Relative residual tolerance (cg only)
        #[arg(long, default_value = "1e-10")]
        tolerance: f64,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Solver {
    /// Iterative conjugate gradient
    Cg,
    /// Direct dense Cholesky factorization
    Cholesky,
}

impl From<Solver> for SolverBackend {
    fn from(solver: Solver) -> Self {
        match solver {
            Solver::Cg => SolverBackend::ConjugateGradient,
            Solver::Cholesky => SolverBackend::DenseCholesky,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> burnish::error::Result<()> {
    match cli.command {
        Commands::Info { input } => info(&input),
        Commands::Fair {
            input,
            output,
            order,
            solver,
            max_iterations,
            tolerance,
            sequential,
        } => {
            let mut options = FairOptions::default()
                .with_backend(solver.into())
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            if sequential {
                options = options.sequential();
            }
            run_fair(&input, &output, order, &options)
        }
    }
}

fn info(input: &Path) -> burnish::error::Result<()> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    let boundary = mesh.vertex_ids().filter(|&v| mesh.is_boundary_vertex(v)).count();
    let isolated = mesh.vertex_ids().filter(|&v| mesh.is_isolated(v)).count();

    println!("{}", input.display());
    println!("  vertices:      {}", mesh.num_vertices());
    println!("  faces:         {}", mesh.num_faces());
    println!("  boundary:      {}", boundary);
    println!("  isolated:      {}", isolated);
    println!("  surface area:  {:.6}", mesh.surface_area());
    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "  bounds:        [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    Ok(())
}

fn run_fair(
    input: &Path,
    output: &Path,
    order: u32,
    options: &FairOptions,
) -> burnish::error::Result<()> {
    let mut mesh: HalfEdgeMesh = io::load(input)?;
    println!(
        "loaded {} ({} vertices, {} faces)",
        input.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );

    let start = Instant::now();
    fair_with(&mut mesh, order, options)?;
    println!("faired with order {} in {:.2?}", order, start.elapsed());

    io::save(&mesh, output)?;
    println!("saved {}", output.display());
    Ok(())
}
