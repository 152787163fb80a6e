//! SENTINEL headless runner.
//!
//! Wires the simulation engine to a game loop thread, a telemetry
//! ingestion thread and the command line.

pub mod game_loop;
pub mod state;
pub mod telemetry;

pub use sentinel_sim as sim;
