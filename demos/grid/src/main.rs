//! grid: multi-intersection Q-learning signal control on a synthetic grid.
//!
//! Builds a `size × size` grid of signalised junctions on the in-process
//! queue simulation, trains one tabular Q-learning agent per junction over
//! a set of demand scenarios, evaluates on the held-out scenario, and
//! compares against the simulator's own fixed-time program.
//!
//! Scenarios are either synthesised in memory (default: seven, scenario 0
//! held out) or discovered as `*.trips.csv` files under `--data-dir`.
//!
//! ```text
//! RUST_LOG=debug cargo run -p grid -- --size 3 --output out
//! ```

mod network;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsc_adapter::{QueueSimConfig, QueueSimulation, Scenario};
use tsc_control::{AgentPool, ControlMode};
use tsc_core::{files_with_suffix, unique_file, ConfigError, ControlConfig, SimRng};
use tsc_episode::{EpisodeControllerBuilder, EpisodeReport, TrainingSchedule};
use tsc_output::{read_qtables, write_qtables, EpisodeOutputObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const SCENARIO_SUFFIX:    &str = ".trips.csv";
const CONFIG_SUFFIX:      &str = ".config.json";
const SYNTHETIC_SCENARIOS: u64 = 7;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Control configuration (JSON).  Defaults apply to omitted fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of `*.trips.csv` demand files, one per scenario.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Junctions per grid side.
    #[arg(
        short,
        long,
        default_value_t = 2,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    size: usize,

    /// Vehicles per synthetic scenario (scaled up for busier scenarios).
    #[arg(long, default_value_t = 200)]
    vehicles: usize,

    /// Departure window of synthetic demand, in ticks.
    #[arg(long, default_value_t = 600)]
    horizon: u64,

    /// Index of the scenario held out for evaluation.
    #[arg(long, default_value_t = 0)]
    held_out: usize,

    /// Skip the fixed-time baseline episode.
    #[arg(long)]
    no_baseline: bool,

    /// Abort any episode that has not drained after this many steps.
    #[arg(long, default_value_t = 100_000)]
    max_steps: u64,

    /// Start from Q-tables saved by an earlier run.
    #[arg(long)]
    load_qtables: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    config.validate()?;
    info!(
        size = cli.size,
        states = config.table_shape().0,
        actions = config.table_shape().1,
        seed = config.seed,
        "configuration loaded"
    );

    // 1. Network and demand.
    let mut sim = QueueSimulation::new(QueueSimConfig::default(), network::grid(cli.size))?;
    let scenarios = match &cli.data_dir {
        Some(dir) => discover_scenarios(dir)?,
        None => synthesize_scenarios(&mut sim, &cli, config.seed),
    };
    info!(scenarios = scenarios.len(), held_out = cli.held_out, "scenarios ready");

    // 2. Controller, optionally continuing from saved tables.
    let names = sim.intersection_names();
    let mut builder =
        EpisodeControllerBuilder::new(config.clone(), sim, names.clone()).max_steps(cli.max_steps);
    if let Some(path) = &cli.load_qtables {
        let tables = read_qtables(path, &names, config.table_shape())
            .with_context(|| format!("reading Q-tables from {}", path.display()))?;
        let mut pool = AgentPool::new(&config, names.len())?;
        pool.load_tables(tables)?;
        info!(path = %path.display(), "continuing from saved Q-tables");
        builder = builder.agents(pool);
    }
    let mut controller = builder.build()?;

    // 3. Output.
    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    serde_json::to_writer_pretty(File::create(cli.output.join("config.json"))?, &config)?;

    #[cfg(feature = "sqlite")]
    let writer = tsc_output::SqliteWriter::new(&cli.output)?;
    #[cfg(not(feature = "sqlite"))]
    let writer = tsc_output::CsvWriter::new(&cli.output)?;
    let mut observer = EpisodeOutputObserver::new(writer);

    // 4. Train, evaluate, baseline.
    let schedule =
        TrainingSchedule::hold_out(scenarios, cli.held_out)?.with_plain_baseline(!cli.no_baseline);
    let t0 = Instant::now();
    let reports = schedule.run(&mut controller, &mut observer)?;
    observer.finish()?;
    info!(
        episodes = reports.len(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "schedule complete"
    );

    let qtables = cli.output.join("qtables.csv");
    write_qtables(
        &qtables,
        names.iter().map(String::as_str).zip(controller.pool().iter().map(|(_, a)| a.table())),
    )?;
    info!(path = %qtables.display(), "Q-tables saved");

    print_summary(&reports);
    Ok(())
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// `--config` if given; else a single `*.config.json` in `--data-dir`; else
/// defaults.
fn load_config(cli: &Cli) -> Result<ControlConfig> {
    let path = match (&cli.config, &cli.data_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => match unique_file(dir, CONFIG_SUFFIX) {
            Ok(path) => Some(path),
            Err(ConfigError::MissingInput { .. }) => None,
            Err(e) => return Err(e.into()),
        },
        (None, None) => None,
    };

    let Some(path) = path else {
        return Ok(ControlConfig::default());
    };
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let config: ControlConfig = serde_json::from_reader(file)
        .with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), "configuration file");
    Ok(config)
}

fn discover_scenarios(dir: &Path) -> Result<Vec<Scenario>> {
    let files = files_with_suffix(dir, SCENARIO_SUFFIX)?;
    if files.is_empty() {
        return Err(ConfigError::MissingInput {
            dir:    dir.to_path_buf(),
            suffix: SCENARIO_SUFFIX.to_owned(),
        }
        .into());
    }
    Ok(files.into_iter().map(Scenario::from_path).collect())
}

/// Register in-memory demand for `scenario_0 … scenario_6`, each a little
/// busier than the last.
fn synthesize_scenarios(sim: &mut QueueSimulation, cli: &Cli, seed: u64) -> Vec<Scenario> {
    let mut rng = SimRng::new(seed);
    (0..SYNTHETIC_SCENARIOS)
        .map(|k| {
            let name = format!("scenario_{k}");
            let mut child = rng.child(k);
            let vehicles = cli.vehicles + cli.vehicles * k as usize / 6;
            let trips = network::demand(&mut child, cli.size, vehicles, cli.horizon);
            sim.register_demand(name.clone(), trips);
            Scenario::new(name.clone(), format!("{name}{SCENARIO_SUFFIX}"))
        })
        .collect()
}

// ── Summary ───────────────────────────────────────────────────────────────────

fn print_summary(reports: &[EpisodeReport]) {
    println!();
    println!("{:<14} {:<9} {:>8} {:>8} {:>10} {:>12}", "scenario", "mode", "steps", "trips", "decisions", "avg trip");
    for r in reports {
        let avg = r
            .average_trip_time
            .map_or_else(|| "undefined".to_owned(), |v| format!("{v:.2}"));
        println!(
            "{:<14} {:<9} {:>8} {:>8} {:>10} {:>12}",
            r.scenario,
            r.mode.to_string(),
            r.steps,
            r.completed_trips,
            r.decisions,
            avg
        );
    }

    let avg_for = |mode: ControlMode| {
        reports
            .iter()
            .rev()
            .find(|r| r.mode == mode)
            .and_then(|r| r.average_trip_time)
    };
    if let (Some(learned), Some(fixed)) = (avg_for(ControlMode::Evaluate), avg_for(ControlMode::Plain)) {
        let change = 100.0 * (learned - fixed) / fixed;
        println!();
        println!("held-out average trip time: learned {learned:.2} vs fixed-time {fixed:.2} ({change:+.1}%)");
    }
}
