//! Simulation engine for SENTINEL.
//!
//! Owns the hecs ECS world, runs systems in a fixed order each tick,
//! and produces `WorldSnapshot`s and bus events for collaborators.

pub mod bus;
pub mod config;
pub mod cover;
pub mod degradation;
pub mod engine;
pub mod escalation;
pub mod game_mode;
pub mod hazards;
pub mod scenario;
pub mod squads;
pub mod systems;
pub mod world_setup;

pub use sentinel_core as core;
pub use config::SimConfig;
pub use engine::SimulationEngine;
