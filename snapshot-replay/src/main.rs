mod load;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Context;
use arith_theory::results::solve_with_splits;
use arith_theory::results::SearchResult;
use arith_theory::statistics::configure;
use arith_theory::termination::NodeBudget;
use arith_theory::termination::TerminationCondition;
use arith_theory::ArithmeticOptions;
use arith_theory::ArithmeticSolver;
use arith_theory::FirstFractional;
use arith_theory::MostFractional;
use clap::Parser;
use clap::ValueEnum;
use log::info;
use log::warn;
use snapshot_format::read_snapshot;

use crate::load::load_snapshot;

#[derive(Debug, Parser)]
#[command(about = "Replays an arithmetic bound snapshot and decides it")]
struct Cli {
    /// The snapshot to replay.
    snapshot: PathBuf,

    /// How the integer variable to branch on is chosen.
    #[arg(short = 'S', long = "selector", value_enum, default_value_t)]
    selector: Selector,

    /// Give up after exploring this many case-split nodes.
    #[arg(short = 'n', long = "nodes")]
    nodes: Option<u64>,

    /// The number of interval propagation rounds over the monomials per check.
    #[arg(long = "nl-rounds", default_value_t = ArithmeticOptions::default().nl_rounds)]
    nl_rounds: u32,

    /// Do not run the Gröbner basis step.
    #[arg(long = "no-grobner")]
    no_grobner: bool,

    /// Print the engine statistics once the snapshot is decided.
    #[arg(short = 's', long = "statistics")]
    statistics: bool,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Selector {
    #[default]
    MostFractional,
    FirstFractional,
}

/// Stops when SIGINT arrives or the node budget runs out.
#[derive(Debug)]
struct Interruptible {
    interrupted: Arc<AtomicBool>,
    budget: Option<NodeBudget>,
}

impl TerminationCondition for Interruptible {
    fn should_stop(&mut self) -> bool {
        self.interrupted.load(Ordering::Relaxed) || self.budget.should_stop()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    arith_theory::print_arith_assert_warning_message!();
    let args = Cli::parse();

    configure(args.statistics, "%% ", None);

    let source = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Error reading {}", args.snapshot.display()))?;
    let snapshot = read_snapshot(&source)
        .with_context(|| format!("Failed to parse snapshot {}", args.snapshot.display()))?;

    let mut solver = ArithmeticSolver::new(ArithmeticOptions {
        nl_rounds: args.nl_rounds,
        enable_grobner: !args.no_grobner,
        ..Default::default()
    });
    let declared = load_snapshot(&mut solver, &snapshot)?;
    info!(
        "Replaying {} with {} rows",
        args.snapshot.display(),
        solver.num_rows()
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))
        .context("Failed to install the interrupt handler")?;
    let mut termination = Interruptible {
        interrupted,
        budget: args.nodes.map(NodeBudget::new),
    };

    let result = match args.selector {
        Selector::MostFractional => solve_with_splits(&mut solver, MostFractional, &mut termination),
        Selector::FirstFractional => {
            solve_with_splits(&mut solver, FirstFractional, &mut termination)
        }
    }?;

    match result {
        SearchResult::Sat(model) => {
            println!("sat");
            for (name, var) in declared {
                println!("{name} = {};", model[var.id as usize]);
            }
        }
        SearchResult::Unsat(explanation) => {
            println!("unsat");
            println!("{explanation}");
        }
        SearchResult::Unknown => println!("unknown"),
        SearchResult::Stopped => {
            warn!("Search stopped before a verdict was reached");
            println!("unknown");
        }
    }

    solver.log_statistics();
    Ok(())
}
