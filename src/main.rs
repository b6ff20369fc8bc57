use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use coasim::algorithm::{Algorithm, AlgorithmKind, DEFAULT_BITS};
use coasim::booth::Booth;
use coasim::error::SimError;
use coasim::fast_booth::FastBooth;
use coasim::metrics::{arithmetic_op_count, operation_histogram, shift_count};
use coasim::non_restoring::NonRestoringDivision;
use coasim::operands::seeded_operands;
use coasim::playback::{Playback, PlaybackConfig};
use coasim::restoring::RestoringDivision;
use coasim::shift_add::ShiftAdd;
use coasim::step::{Operation, Step};
use coasim::summary::Outcome;
use coasim::sweep::sweep;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coasim", about = "Step-by-step simulator for binary division and multiplication")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate one operand pair and print every step.
    Run {
        #[command(flatten)]
        sim: SimArgs,

        /// Print the full trace as JSON instead of register tables.
        #[arg(long)]
        json: bool,

        /// Write the outcome as JSON to this file (e.g. coa-result.json).
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Replay a simulation one step at a time.
    Play {
        #[command(flatten)]
        sim: SimArgs,

        /// Playback speed multiplier (0.5 to 2.0).
        #[arg(long, default_value_t = PlaybackConfig::default().speed)]
        speed: f64,

        /// Pause between steps at speed 1.0, in milliseconds.
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
    /// Check an algorithm against native arithmetic over its exact domain.
    Sweep {
        #[arg(long, value_enum)]
        algorithm: AlgorithmKind,

        /// Register width in bits.
        #[arg(long, default_value_t = DEFAULT_BITS)]
        bits: usize,
    },
    /// List the available algorithms.
    List,
}

#[derive(Args)]
struct SimArgs {
    #[arg(long, value_enum)]
    algorithm: AlgorithmKind,

    /// Register width in bits.
    #[arg(long, default_value_t = DEFAULT_BITS)]
    bits: usize,

    /// Dividend or multiplicand.
    #[arg(allow_negative_numbers = true, required_unless_present = "random")]
    operand1: Option<i64>,

    /// Divisor or multiplier.
    #[arg(allow_negative_numbers = true, required_unless_present = "random")]
    operand2: Option<i64>,

    /// Draw demo operands instead of reading them.
    #[arg(long, conflicts_with_all = ["operand1", "operand2"])]
    random: bool,

    /// Seed for --random.
    #[arg(long, requires = "random")]
    seed: Option<u64>,
}

impl SimArgs {
    fn operands(&self) -> (i64, i64) {
        match (self.operand1, self.operand2) {
            (Some(a), Some(b)) if !self.random => (a, b),
            _ => {
                let seed = self.seed.unwrap_or_else(rand::random);
                eprintln!("Random operands from seed {seed}");
                seeded_operands(self.algorithm, seed)
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { sim, json, export } => {
            let steps = simulate(&sim);
            if json {
                match serde_json::to_string_pretty(&steps) {
                    Ok(text) => println!("{text}"),
                    Err(e) => fail(&e),
                }
            } else {
                for step in &steps {
                    print!("{}", step.render());
                }
                print_outcome(sim.algorithm, &steps);
                print_metrics(&steps);
            }
            if let Some(path) = export {
                export_outcome(sim.algorithm, &steps, &path);
            }
        }
        Command::Play {
            sim,
            speed,
            delay_ms,
        } => {
            let config = PlaybackConfig {
                speed,
                step_delay: Duration::from_millis(delay_ms),
            };
            let steps = simulate(&sim);
            run_playback(sim.algorithm, steps, config);
        }
        Command::Sweep { algorithm, bits } => run_sweep(algorithm, bits),
        Command::List => {
            for kind in AlgorithmKind::ALL {
                let (first, second) = kind.operand_labels();
                let flag = kind
                    .to_possible_value()
                    .map(|v| v.get_name().to_owned())
                    .unwrap_or_default();
                println!("{flag:<26} {}", kind.name());
                println!("{:<26} {}", "", kind.description());
                println!("{:<26} operands: {first}, {second}", "");
            }
        }
    }
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("error: {e}");
    std::process::exit(1);
}

fn simulate(sim: &SimArgs) -> Vec<Step> {
    let (operand1, operand2) = sim.operands();
    let result = match sim.algorithm {
        AlgorithmKind::RestoringDivision => {
            dispatch::<RestoringDivision>(operand1, operand2, sim.bits)
        }
        AlgorithmKind::NonRestoringDivision => {
            dispatch::<NonRestoringDivision>(operand1, operand2, sim.bits)
        }
        AlgorithmKind::ShiftAddMultiplication => dispatch::<ShiftAdd>(operand1, operand2, sim.bits),
        AlgorithmKind::BoothMultiplication => dispatch::<Booth>(operand1, operand2, sim.bits),
        AlgorithmKind::FastBoothMultiplication => {
            dispatch::<FastBooth>(operand1, operand2, sim.bits)
        }
    };
    result.unwrap_or_else(|e| fail(&e))
}

fn dispatch<A: Algorithm>(operand1: i64, operand2: i64, bits: usize) -> Result<Vec<Step>, SimError> {
    let (first, second) = A::KIND.operand_labels();
    eprintln!(
        "{}: {first} = {operand1}, {second} = {operand2}, {bits}-bit registers",
        A::KIND.name()
    );
    A::simulate(operand1, operand2, bits)
}

fn print_outcome(kind: AlgorithmKind, steps: &[Step]) {
    let Some(outcome) = Outcome::from_steps(kind, steps) else {
        return;
    };
    println!();
    match (outcome.quotient, outcome.remainder) {
        (Some(q), Some(r)) => {
            println!("Quotient:  {q}");
            println!("Remainder: {r}");
            println!("QR:AC      {}", outcome.binary);
        }
        _ => {
            println!("Product:   {}", outcome.decimal);
            println!("AC:MQ      {}", outcome.binary);
        }
    }
}

fn print_metrics(steps: &[Step]) {
    let hist = operation_histogram(steps);
    eprintln!("Step counts:");
    for op in Operation::ALL {
        eprintln!("  {:<10} {}", op.name(), hist[op.index()]);
    }
    eprintln!("  Arithmetic: {}", arithmetic_op_count(steps));
    eprintln!("  Shifts:     {}", shift_count(steps));
}

fn export_outcome(kind: AlgorithmKind, steps: &[Step], path: &Path) {
    let Some(outcome) = Outcome::from_steps(kind, steps) else {
        fail(&"trace has no result to export");
    };
    let json = outcome.to_json().unwrap_or_else(|e| fail(&e));
    if let Err(e) = std::fs::write(path, json) {
        fail(&format!("cannot write {}: {e}", path.display()));
    }
    eprintln!("Exported result to {}", path.display());
}

fn run_playback(kind: AlgorithmKind, steps: Vec<Step>, config: PlaybackConfig) {
    let total = steps.len();
    let mut playback = Playback::new(steps);
    playback.set_speed(config.speed);

    if let Some(step) = playback.current_step() {
        print!("Step 1/{total} {}", step.render());
    }
    playback.play();
    loop {
        std::thread::sleep(playback.delay(config.step_delay));
        let index = playback.current_index() + 2;
        match playback.tick() {
            Some(step) => print!("Step {index}/{total} {}", step.render()),
            None => break,
        }
    }
    print_outcome(kind, playback.steps());
}

fn run_sweep(kind: AlgorithmKind, bits: usize) {
    let start = std::time::Instant::now();
    let report = sweep(kind, bits).unwrap_or_else(|e| fail(&e));
    let elapsed = start.elapsed();

    eprintln!("Sweep results:");
    eprintln!("  Algorithm:  {}", kind.name());
    eprintln!("  Width:      {bits} bits");
    eprintln!("  Checked:    {}", report.checked);
    eprintln!("  Mismatches: {}", report.mismatches.len());
    eprintln!("  Elapsed:    {elapsed:.2?}");

    for m in report.mismatches.iter().take(10) {
        let actual = match &m.actual {
            Ok(answer) => answer.to_string(),
            Err(e) => e.to_string(),
        };
        println!("{} {}: expected {}, got {actual}", m.operand1, m.operand2, m.expected);
    }
    if !report.is_clean() {
        std::process::exit(1);
    }
}
