//! Navigation for SENTINEL.
//!
//! Planar geometry, smoothed per-entity motion, the street graph
//! and the hazard-aware pathfinder.

pub use sentinel_core as core;

pub mod geometry;
pub mod motion;
pub mod pathfinder;
pub mod street_graph;

pub use geometry::{Obstacles, Zone};
pub use motion::{smooth_path, MotionController};
pub use pathfinder::Pathfinder;
pub use street_graph::StreetGraph;
