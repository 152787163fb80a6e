//! Game loop thread: owns the engine, ticks it and publishes snapshots.
//!
//! Commands arrive over a bounded channel and are queued into the engine
//! at tick boundaries. The latest snapshot is kept in `AppState` for
//! polling. In realtime mode the loop sleeps to hold wall-clock pace.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use sentinel_core::constants::DT;
use sentinel_core::state::WorldSnapshot;
use sentinel_sim::SimulationEngine;

use crate::state::{AppState, LoopCommand};

const LOOP_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    /// Stop after this many ticks; `None` runs until the game is over.
    pub max_ticks: Option<u64>,
    pub dt: f64,
    /// Sleep between ticks to match wall-clock time.
    pub realtime: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_ticks: None,
            dt: DT,
            realtime: false,
        }
    }
}

/// Why the loop stopped, and the last state it produced.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub ticks: u64,
    pub reason: StopReason,
    pub snapshot: WorldSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    GameOver,
    TickLimit,
    Shutdown,
}

/// Run `engine` on a new thread. Returns the command sender and a handle
/// yielding the outcome.
pub fn spawn_game_loop(
    engine: SimulationEngine,
    options: LoopOptions,
    state: AppState,
) -> std::io::Result<(Sender<LoopCommand>, JoinHandle<LoopOutcome>)> {
    let (cmd_tx, cmd_rx) = bounded::<LoopCommand>(LOOP_CHANNEL_CAPACITY);
    let handle = std::thread::Builder::new()
        .name("sentinel-game-loop".into())
        .spawn(move || {
            let outcome = run_game_loop(engine, options, &cmd_rx, &state);
            state.stop();
            outcome
        })?;
    Ok((cmd_tx, handle))
}

/// The game loop. Runs until game over, the tick limit, `Shutdown` or
/// disconnection of every command sender.
pub fn run_game_loop(
    mut engine: SimulationEngine,
    options: LoopOptions,
    cmd_rx: &Receiver<LoopCommand>,
    state: &AppState,
) -> LoopOutcome {
    let tick_duration = Duration::from_secs_f64(options.dt.max(0.0));
    let mut next_tick_time = Instant::now();
    let mut ticks = 0u64;
    let mut snapshot = engine.snapshot();

    let reason = loop {
        // 1. Drain pending commands
        let mut shutdown = false;
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Sim(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    shutdown = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        if shutdown {
            break StopReason::Shutdown;
        }

        // 2. Advance one tick
        snapshot = engine.tick(options.dt);
        ticks += 1;
        for envelope in &snapshot.events {
            tracing::trace!(tick = envelope.tick, topic = ?envelope.topic(), "event");
        }

        // 3. Store latest snapshot for polling
        state.store_snapshot(snapshot.clone());

        if snapshot.game.state.is_over() {
            break StopReason::GameOver;
        }
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break StopReason::TickLimit;
        }

        // 4. Hold wall-clock pace
        if options.realtime {
            next_tick_time += tick_duration;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > tick_duration * 2 {
                // Too far behind, reset to avoid a catch-up spiral
                next_tick_time = now;
            }
        }
    };

    tracing::info!(ticks, ?reason, state = ?snapshot.game.state, "game loop stopped");
    LoopOutcome {
        ticks,
        reason,
        snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::commands::{Command, TargetSpec};
    use sentinel_core::enums::{Alliance, AssetType};
    use sentinel_core::types::Position;
    use sentinel_sim::config::{NpcConfig, SimConfig};

    fn quiet_engine() -> SimulationEngine {
        SimulationEngine::new(SimConfig {
            npc: NpcConfig {
                population: 0,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = bounded::<LoopCommand>(8);
        tx.send(LoopCommand::Sim(Command::BeginWar)).unwrap();
        tx.send(LoopCommand::Sim(Command::ClearHazards)).unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let commands: Vec<LoopCommand> = rx.try_iter().collect();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], LoopCommand::Sim(Command::BeginWar)));
        assert!(matches!(commands[1], LoopCommand::Sim(Command::ClearHazards)));
        assert!(matches!(commands[2], LoopCommand::Shutdown));
    }

    #[test]
    fn test_tick_limit_stops_loop() {
        let (_tx, rx) = bounded::<LoopCommand>(8);
        let state = AppState::new();
        let options = LoopOptions {
            max_ticks: Some(25),
            ..Default::default()
        };
        let outcome = run_game_loop(quiet_engine(), options, &rx, &state);
        assert_eq!(outcome.reason, StopReason::TickLimit);
        assert_eq!(outcome.ticks, 25);
        assert_eq!(outcome.snapshot.time.tick, 25);
        assert_eq!(state.latest().unwrap().time.tick, 25);
    }

    #[test]
    fn test_commands_reach_engine() {
        let (tx, rx) = bounded::<LoopCommand>(8);
        tx.send(LoopCommand::Sim(Command::AddTarget(
            TargetSpec::new(Alliance::Friendly, AssetType::Turret, Position::ORIGIN).with_id("turret-a"),
        )))
        .unwrap();
        let options = LoopOptions {
            max_ticks: Some(1),
            ..Default::default()
        };
        let outcome = run_game_loop(quiet_engine(), options, &rx, &AppState::new());
        assert!(outcome.snapshot.targets.iter().any(|t| t.id == "turret-a"));
    }

    #[test]
    fn test_shutdown_from_other_thread() {
        let state = AppState::new();
        let (tx, handle) = spawn_game_loop(quiet_engine(), LoopOptions::default(), state.clone()).unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();
        let outcome = handle.join().unwrap();
        assert_eq!(outcome.reason, StopReason::Shutdown);
        assert!(!state.is_running());
    }

    #[test]
    fn test_empty_schedule_ends_in_victory() {
        let mut config = SimConfig::default();
        config.npc.population = 0;
        config.game.waves.clear();
        let mut engine = SimulationEngine::new(config);
        engine.add_target(TargetSpec::new(Alliance::Friendly, AssetType::Turret, Position::ORIGIN));
        assert!(engine.begin_war());

        let (_tx, rx) = bounded::<LoopCommand>(8);
        let options = LoopOptions {
            max_ticks: Some(100),
            ..Default::default()
        };
        let outcome = run_game_loop(engine, options, &rx, &AppState::new());
        assert_eq!(outcome.reason, StopReason::GameOver);
        assert_eq!(outcome.ticks, 1);
    }
}
