use std::collections::HashMap;
use std::process;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use sparse_sigma::prelude::*;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser)]
#[command(name = "sparse-sigma")]
#[command(about = "Compute the sparse sigma matrix of a DAE system")]
#[command(version)]
struct Args {
    /// Demonstration model to analyse
    #[arg(long, value_enum, default_value_t = ModelArg::Diffusion)]
    model: ModelArg,

    /// Problem size N; the system has N + 1 equations
    #[arg(long, short = 'n', default_value_t = 10)]
    size: usize,

    /// Rows between progress messages, 0 to disable
    #[arg(long, default_value_t = 1000)]
    progress_interval: usize,

    /// Largest row count that is rendered as a dense grid
    #[arg(long, default_value_t = DEFAULT_RENDER_LIMIT)]
    render_limit: usize,

    /// Keep the partial structure when the DAE function fails
    #[arg(long)]
    keep_going: bool,

    /// Residual expression; repeat to analyse an expression system instead of a model
    #[arg(long = "equation", short = 'e')]
    equations: Vec<String>,

    /// Bind an identifier in the equations to a number, as NAME=VALUE
    #[arg(long = "constant", short = 'c', value_parser = parse_constant)]
    constants: Vec<(String, f64)>,

    /// Run diffusion at N = 50,000,000, then diffusion and arc length at N = 10
    #[arg(long, conflicts_with_all = ["equations", "model", "size"])]
    demo: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Diffusion,
    ArcLength,
}

impl From<ModelArg> for Model {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Diffusion => Model::Diffusion,
            ModelArg::ArcLength => Model::ArcLength,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::WARN.into()))
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.demo {
        analyse_model(args, Model::Diffusion, 50_000_000)?;
        analyse_model(args, Model::Diffusion, 10)?;
        return analyse_model(args, Model::ArcLength, 10);
    }

    if args.equations.is_empty() {
        return analyse_model(args, args.model.into(), args.size);
    }

    let constants: HashMap<String, f64> = args.constants.iter().cloned().collect();
    let system = ExpressionSystem::with_constants(args.equations.clone(), constants)?;
    println!("Variables: {}", system.sorted_variables().join(", "));

    let mut matrix = SigmaMatrix::new(system.size());
    let start = Instant::now();
    let summary = builder(args).compute(&mut matrix, &system, &())?;
    report(args, &matrix, &summary, start)
}

fn analyse_model(args: &Args, model: Model, n: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("Computing sparse sigma matrix: {model}, N = {n}");

    let mut matrix = SigmaMatrix::new(model.system_size(n));
    let start = Instant::now();
    let summary = builder(args).compute(&mut matrix, &model, &n)?;
    report(args, &matrix, &summary, start)
}

fn builder(args: &Args) -> StructureBuilder<impl ProgressObserver> {
    let failure_policy = if args.keep_going {
        FailurePolicy::ContinuePartial
    } else {
        FailurePolicy::Abort
    };

    StructureBuilder::new()
        .progress_interval(args.progress_interval)
        .failure_policy(failure_policy)
        .observer(|row: usize, total: usize| println!("  row {row} of {total}"))
}

fn report(
    args: &Args,
    matrix: &SigmaMatrix,
    summary: &StructureSummary,
    start: Instant,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Done in {:.3?}: {} rows, {} nonzeros, highest order {}",
        start.elapsed(),
        summary.rows,
        summary.nonzeros,
        summary
            .max_order
            .map_or_else(|| "-".to_string(), |order| order.to_string())
    );

    if matrix.row_count() <= args.render_limit {
        print!("{}", matrix.dense_view(args.render_limit)?.with_highlight(true));
    }
    println!();
    Ok(())
}

fn parse_constant(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{name}': {e}"))?;
    Ok((name.trim().to_string(), value))
}
