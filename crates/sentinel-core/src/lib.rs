//! Core types and definitions for the SENTINEL battlespace simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! the target record, cache components, commands, snapshots, events,
//! asset profiles and tunable constants. It has no runtime dependency
//! beyond serialization and vector math.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod profiles;
pub mod state;
pub mod target;
pub mod types;

pub use error::SimError;
pub use target::Target;
pub use types::{Position, SimTime};

#[cfg(test)]
mod tests;
