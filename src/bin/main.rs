//! rabc Command Line Interface
//!
//! Trains the kernel angle-based classifier on a JSON column dataset,
//! inspects saved solutions, and checks the analytic gradient.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use rabc::core::{ABCError, DerivativeWeighting, Objective, Result};
use rabc::persistence::SerializableSolution;
use rabc::{AngleBasedClassifier, AngleObjective, ColumnDataset};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rabc")]
#[command(about = "Kernel angle-based multicategory classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rabc Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the classifier objective on a dataset
    Train(TrainArgs),
    /// Display a saved solution
    Info(InfoArgs),
    /// Compare the analytic gradient with finite differences
    CheckGradient(CheckArgs),
}

#[derive(Args)]
struct ObjectiveArgs {
    /// Dataset file (JSON column dataset)
    #[arg(long)]
    data: PathBuf,

    /// Kernel: "RBF <sigma>" or "POLY <shift> <degree>"
    #[arg(short, long, default_value = "RBF 1.0")]
    kernel: String,

    /// Robustness constant of the margin loss
    #[arg(short = 'c', long, default_value = "1.0")]
    c: f64,

    /// Regularization weight (recorded only)
    #[arg(long, default_value = "1.0")]
    lambda: f64,

    /// Worker threads (clamped to available parallelism)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Use derivatives unscaled by the response magnitude
    #[arg(long)]
    legacy_derivative: bool,
}

impl ObjectiveArgs {
    fn threads(&self) -> usize {
        self.threads
            .unwrap_or_else(rabc::parallel::available_threads)
    }

    fn weighting(&self) -> DerivativeWeighting {
        if self.legacy_derivative {
            DerivativeWeighting::Unweighted
        } else {
            DerivativeWeighting::Weighted
        }
    }
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    objective: ObjectiveArgs,

    /// Output solution file
    #[arg(short, long)]
    output: PathBuf,

    /// Maximum iterations
    #[arg(short, long, default_value = "1000")]
    max_iterations: usize,

    /// Number of correction pairs kept by the solver
    #[arg(long, default_value = "5")]
    memory: usize,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.00001")]
    epsilon: f64,
}

#[derive(Args)]
struct InfoArgs {
    /// Solution file
    solution: PathBuf,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    objective: ObjectiveArgs,

    /// Seed for the random evaluation point
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Finite-difference step
    #[arg(long, default_value = "0.000001")]
    step: f64,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Info(args) => info_command(args),
        Commands::CheckGradient(args) => check_gradient_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_dataset(path: &Path) -> Result<ColumnDataset> {
    info!("Loading dataset from: {path:?}");
    let file = File::open(path).map_err(ABCError::IoError)?;
    let data: ColumnDataset = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| ABCError::SerializationError(e.to_string()))?;
    data.validate()?;
    Ok(data)
}

fn train_command(args: TrainArgs) -> Result<()> {
    let data = load_dataset(&args.objective.data)?;
    info!(
        "Parameters: c={}, kernel={}, max_iter={}, m={}, epsilon={}",
        args.objective.c, args.objective.kernel, args.max_iterations, args.memory, args.epsilon
    );

    let mut abc = AngleBasedClassifier::builder()
        .with_c(args.objective.c)
        .with_lambda(args.objective.lambda)
        .with_kernel(&args.objective.kernel)
        .with_threads(args.objective.threads())
        .with_max_iterations(args.max_iterations)
        .with_memory(args.memory)
        .with_epsilon(args.epsilon)
        .with_derivative_weighting(args.objective.weighting())
        .build()?;

    let index = abc.add_dataset(data);
    abc.bind(index)?;
    let report = abc.run()?;
    println!(
        "Solver finished: {:?} after {} iterations, objective {:.6e}, |g| {:.3e}",
        report.status, report.iterations, report.value, report.gradient_norm
    );

    let solution = SerializableSolution::from_classifier(&abc)?;
    solution.save_to_file(&args.output)?;
    info!("Solution saved to: {:?}", args.output);

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let solution = SerializableSolution::load_from_file(&args.solution)?;
    solution.print_summary();
    Ok(())
}

fn check_gradient_command(args: CheckArgs) -> Result<()> {
    if args.step.is_nan() || args.step <= 0.0 {
        return Err(ABCError::InvalidParameter(format!(
            "Finite-difference step must be positive, got {}",
            args.step
        )));
    }

    let data = load_dataset(&args.objective.data)?;
    let mut objective = AngleObjective::new(
        args.objective.c,
        args.objective.lambda,
        &args.objective.kernel,
        args.objective.threads(),
    )?
    .with_derivative_weighting(args.objective.weighting());
    objective.bind(&data)?;

    let dim = objective.dimension();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let x: Vec<f64> = (0..dim).map(|_| rng.gen_range(-0.5..0.5)).collect();

    let mut g = vec![0.0; dim];
    let f = objective.value_and_gradient(&x, &mut g)?;

    let h = args.step;
    let mut xp = x.clone();
    let mut max_error = 0.0_f64;
    for i in 0..dim {
        xp[i] = x[i] + h;
        let fp = objective.value(&xp)?;
        xp[i] = x[i] - h;
        let fm = objective.value(&xp)?;
        xp[i] = x[i];

        let fd = (fp - fm) / (2.0 * h);
        let err = (g[i] - fd).abs() / (1.0 + fd.abs());
        max_error = max_error.max(err);
    }

    println!("Dimension: {dim}");
    println!("Objective: {f:.6e}");
    println!("Max relative gradient error: {max_error:.3e}");
    Ok(())
}
