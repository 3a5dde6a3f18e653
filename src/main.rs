//! Driver (C6): reads the command line, owns the BDD `Manager` for the run,
//! wires the AAG loader (C2) through the path counter (C3) and sampler (C4)
//! to the reshape/emit stage (C5), and maps error kinds to exit codes.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use solgen::error::{Result, SolGenError};
use solgen::sample::Outcome;
use solgen::{aag, count, reshape, sample};

/// Draw uniformly (weighted) random satisfying assignments to the primary
/// inputs of an And-Inverter-Graph circuit.
#[derive(Parser, Debug)]
#[command(name = "solgen")]
#[command(about = "BDD-backed random solution generator for AAG constraints")]
struct Args {
    /// Input AAG file (ASCII And-Inverter-Graph, header `aag M I L O A`).
    input: PathBuf,

    /// Seed for the deterministic Mersenne-Twister RNG.
    random_seed: u64,

    /// Number of distinct satisfying assignments to draw.
    num_solutions: usize,

    /// Output JSON path.
    output: PathBuf,

    /// Dump the constructed BDD to Graphviz DOT at this path (debug only,
    /// not part of the JSON contract).
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Raise the default log level to `debug` (shorthand for `RUST_LOG`).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("solgen: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let start = Instant::now();
    log::info!("reading {}", args.input.display());
    let text = std::fs::read_to_string(&args.input)?;

    let circuit = aag::load(&text)?;
    log::info!(
        "loaded circuit: {} primary inputs, {} live bdd nodes",
        circuit.num_inputs,
        circuit.manager.node_count()
    );

    if let Some(dot_path) = &args.dot {
        let names: Vec<String> = circuit
            .positions
            .iter()
            .map(|p| format!("var_{}[{}]", p.group, p.bit))
            .collect();
        let dot = circuit.manager.as_dot_string(circuit.output, &names);
        std::fs::write(dot_path, dot)?;
        log::info!("wrote bdd dump to {}", dot_path.display());
    }

    let counts = count::PathCounts::build(&circuit.manager, circuit.output);

    let outcome = sample::sample(
        &circuit.manager,
        circuit.output,
        &counts,
        circuit.num_inputs,
        args.num_solutions,
        args.random_seed,
    );

    let assignments = match outcome {
        Outcome::Complete(v) => v,
        Outcome::GaveUp(v) => {
            log::warn!(
                "sampler gave up: emitting {} of {} requested solutions",
                v.len(),
                args.num_solutions
            );
            eprintln!(
                "solgen: warning: {}",
                SolGenError::SamplerGaveUp {
                    found: v.len(),
                    requested: args.num_solutions,
                }
            );
            v
        }
    };

    let document = reshape::reshape(&assignments, &circuit.positions);
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| SolGenError::Internal(format!("json serialization failed: {}", e)))?;
    std::fs::write(&args.output, json)?;

    log::info!(
        "wrote {} assignments to {} in {:.3}s",
        assignments.len(),
        args.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
