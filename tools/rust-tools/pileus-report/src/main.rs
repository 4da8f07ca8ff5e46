use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser};
use logging::{init_logging, LogOutput};
use pileus_allocation::{
    ComparisonTable, SimulationConfig, Simulator, SweepConfig, TcbView, Trace,
};
use pileus_exposure::{ExposureConfig, Mitigation, ProbabilityEngine};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

mod logging;

#[derive(Parser, Debug)]
#[command(version, about = "Exposure and TCB-size reports for a shared node pool")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Format of the log lines written to stderr.
    #[clap(long, value_enum, default_value_t = LogOutput::Console, global = true)]
    log_output: LogOutput,

    /// Default log level, overridden by RUST_LOG.
    #[clap(long, default_value_t = Level::INFO, global = true)]
    log_level: Level,
}

#[allow(clippy::large_enum_variant)]
#[derive(Parser, Debug)]
enum Commands {
    /// Expected number of distinct nodes touched after each round of
    /// uniformly random draws.
    Exposure(ExposureArgs),

    /// Average TCB size of the four assignment policies, either for one trace
    /// file or for a sweep of generated traces.
    Compare(CompareArgs),

    /// Writes a generated trace in the two column text form `compare --trace` reads.
    Trace {
        /// Number of operations.
        #[clap(long)]
        ops: usize,

        /// Users are drawn uniformly from 0..users.
        #[clap(
            long,
            default_value_t = 400,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        users: usize,

        #[clap(long, default_value_t = 0)]
        seed: u64,
    },

    // Prints the help, optionally as markdown. Used for docs generation.
    #[clap(hide = true)]
    PrintAllHelp {
        #[arg(long, required = true)]
        markdown: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct ExposureArgs {
    /// TOML file with an `[exposure]` table and optional `[mitigation]`.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Size of the node pool.
    #[clap(long)]
    nodes: Option<u64>,

    /// Nodes drawn without replacement each round.
    #[clap(long)]
    draw: Option<u64>,

    #[clap(long)]
    rounds: Option<u64>,

    /// Freeze exposure after this round.
    #[clap(long, conflicts_with = "revoke")]
    expire_after: Option<u64>,

    /// Start revoking at the first round and be fully revoked by the second.
    #[clap(long, num_args = 2, value_names = ["START", "FULL"])]
    revoke: Option<Vec<u64>>,

    /// Seed for the jitter added once a mitigation has kicked in.
    #[clap(long, default_value_t = 0)]
    seed: u64,
}

#[derive(ClapArgs, Debug)]
struct CompareArgs {
    /// TOML file with `[simulation]` and `[sweep]` tables.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Replay this trace instead of sweeping generated ones.
    #[clap(long)]
    trace: Option<PathBuf>,

    #[clap(long)]
    nodes: Option<usize>,

    /// Operations a node serves before it stops taking new work.
    #[clap(long)]
    capacity: Option<usize>,

    /// Nodes assigned to every operation.
    #[clap(long)]
    per_op: Option<usize>,

    #[clap(long)]
    users: Option<usize>,

    /// Least-TCB window width, defaults to the whole pool.
    #[clap(long)]
    window: Option<usize>,

    /// An exhausted window restarts at operations / divisor.
    #[clap(long)]
    recenter_divisor: Option<usize>,

    #[clap(long)]
    seed: Option<u64>,

    /// First trial size of the sweep.
    #[clap(long)]
    start: Option<usize>,

    /// Last trial size of the sweep, inclusive.
    #[clap(long)]
    end: Option<usize>,

    #[clap(long)]
    step: Option<usize>,

    /// Which average to print: per-node or per-user.
    #[clap(long, default_value = "per-node")]
    view: TcbView,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ReportConfig {
    simulation: SimulationConfig,
    sweep: SweepConfig,
    exposure: ExposureConfig,
    mitigation: Option<Mitigation>,
}

impl ReportConfig {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }
}

impl ExposureArgs {
    fn apply(&self, config: &mut ReportConfig) {
        let exposure = &mut config.exposure;
        exposure.nodes = self.nodes.unwrap_or(exposure.nodes);
        exposure.draw = self.draw.unwrap_or(exposure.draw);
        exposure.rounds = self.rounds.unwrap_or(exposure.rounds);

        if let Some(after) = self.expire_after {
            config.mitigation = Some(Mitigation::Expiration { after });
        }
        if let Some(&[start, full]) = self.revoke.as_deref() {
            config.mitigation = Some(Mitigation::Revocation { start, full });
        }
    }
}

impl CompareArgs {
    fn apply(&self, config: &mut ReportConfig) {
        let sim = &mut config.simulation;
        sim.nodes = self.nodes.unwrap_or(sim.nodes);
        sim.capacity = self.capacity.unwrap_or(sim.capacity);
        sim.nodes_per_op = self.per_op.unwrap_or(sim.nodes_per_op);
        sim.total_users = self.users.unwrap_or(sim.total_users);
        sim.window = self.window.or(sim.window);
        sim.recenter_divisor = self.recenter_divisor.unwrap_or(sim.recenter_divisor);
        sim.seed = self.seed.unwrap_or(sim.seed);

        let sweep = &mut config.sweep;
        sweep.start = self.start.unwrap_or(sweep.start);
        sweep.end = self.end.unwrap_or(sweep.end);
        sweep.step = self.step.unwrap_or(sweep.step);
    }
}

fn write_stdout(text: impl std::fmt::Display) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

fn run_exposure(args: ExposureArgs) -> Result<()> {
    let mut config = ReportConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    if let Some(mitigation) = &config.mitigation {
        mitigation.validate(config.exposure.rounds)?;
    }
    let mut engine = ProbabilityEngine::new(config.exposure)?;
    let curve = engine.exposure_curve();
    let curve = match config.mitigation {
        Some(mitigation) => {
            info!(?mitigation, seed = args.seed, "applying mitigation");
            mitigation.apply(&curve, args.seed)?
        }
        None => curve,
    };
    write_stdout(curve)
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let mut config = ReportConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    let sim = Simulator::new(config.simulation)?;
    let table = match &args.trace {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read trace {}", path.display()))?;
            let trace = Trace::parse(&text)
                .with_context(|| format!("failed to parse trace {}", path.display()))?;
            info!(operations = trace.len(), users = trace.total_users(), "loaded trace");
            ComparisonTable {
                rows: vec![sim.compare(&trace)?],
            }
        }
        None => sim.sweep(&config.sweep)?,
    };
    write_stdout(table.render(args.view))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_output, args.log_level)?;

    match args.command {
        Commands::Exposure(exposure) => run_exposure(exposure),
        Commands::Compare(compare) => run_compare(compare),
        Commands::Trace { ops, users, seed } => write_stdout(Trace::generate(ops, users, seed)),
        Commands::PrintAllHelp { markdown } => {
            // This is a required argument for the time being.
            assert!(markdown);

            let () = clap_markdown::print_help_markdown::<Args>();
            Ok(())
        }
    }
}
