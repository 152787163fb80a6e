//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions taking `&mut World` (or `&World` for
//! read-only passes) plus whatever engine-owned managers they need for the
//! duration of one call. Per-entity failures are logged and skipped.

pub mod behavior;
pub mod caches;
pub mod cleanup;
pub mod cognition;
pub mod combat;
pub mod motion;
pub mod snapshot;
