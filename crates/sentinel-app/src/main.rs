use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::prelude::*;

use sentinel_app::game_loop::{self, LoopOptions};
use sentinel_app::state::AppState;
use sentinel_app::telemetry::TelemetryIngestor;
use sentinel_core::constants::DT;
use sentinel_sim::scenario::Scenario;
use sentinel_sim::{SimConfig, SimulationEngine};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioArg {
    Defense,
    Skirmish,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Defense => Scenario::Defense,
            ScenarioArg::Skirmish => Scenario::Skirmish,
        }
    }
}

/// Headless SENTINEL battlespace simulation.
#[derive(Debug, Parser)]
#[command(name = "sentinel", version)]
struct Args {
    /// TOML config file. Without it the scenario preset's config is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Force layout and wave schedule preset.
    #[arg(long, value_enum, default_value = "defense")]
    scenario: ScenarioArg,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    /// Seconds per tick.
    #[arg(long, default_value_t = DT)]
    dt: f64,

    /// Pace ticks to wall-clock time.
    #[arg(long)]
    realtime: bool,

    /// Read line-delimited JSON robot telemetry from stdin.
    #[arg(long)]
    telemetry_stdin: bool,
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(args: &Args, scenario: Scenario) -> Result<SimConfig, sentinel_core::error::SimError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => scenario.config(SimConfig::default().seed),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let scenario = Scenario::from(args.scenario);

    let config = match load_config(&args, scenario) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("sentinel: {err}");
            return ExitCode::FAILURE;
        }
    };
    if !(args.dt.is_finite() && args.dt > 0.0) {
        eprintln!("sentinel: --dt must be a positive number, got {}", args.dt);
        return ExitCode::FAILURE;
    }
    tracing::info!(seed = config.seed, ?scenario, dt = args.dt, "starting");

    let mut engine = SimulationEngine::new(config);
    scenario.populate(&mut engine);
    let mut ingestor = None;
    if args.telemetry_stdin {
        match TelemetryIngestor::spawn(BufReader::new(std::io::stdin()), engine.command_sender()) {
            Ok(handle) => ingestor = Some(handle),
            Err(err) => {
                eprintln!("sentinel: cannot start telemetry ingestion: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    engine.begin_war();

    let options = LoopOptions {
        max_ticks: args.ticks,
        dt: args.dt,
        realtime: args.realtime,
    };
    let state = AppState::new();
    // The sender must outlive the loop: dropping it reads as shutdown.
    let (_loop_tx, handle) = match game_loop::spawn_game_loop(engine, options, state) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("sentinel: cannot start game loop: {err}");
            return ExitCode::FAILURE;
        }
    };
    let Ok(outcome) = handle.join() else {
        eprintln!("sentinel: game loop panicked");
        return ExitCode::FAILURE;
    };

    // stdin may stay open; the thread is left to exit with the process.
    if let Some(ingestor) = &ingestor {
        ingestor.stop();
        if let Some(err) = ingestor.last_error() {
            tracing::warn!(accepted = ingestor.accepted(), dropped = ingestor.dropped(), %err, "telemetry errors");
        }
    }

    let game = &outcome.snapshot.game;
    println!("stopped:       {:?} after {} ticks ({:.1}s)", outcome.reason, outcome.ticks, outcome.snapshot.time.elapsed_secs);
    println!("state:         {:?}", game.state);
    println!("waves:         {}/{}", game.wave, game.total_waves);
    println!("eliminations:  {}", game.eliminations);
    println!("escaped:       {}", game.escaped);
    println!("threat level:  {:?}", game.threat_level);
    ExitCode::SUCCESS
}
