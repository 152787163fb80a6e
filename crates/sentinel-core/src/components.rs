//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods. The `Target`
//! record lives in its own module because it guards its invariants.

use serde::{Deserialize, Serialize};

use crate::enums::Alliance;
use crate::types::Position;

/// Projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u64,
    pub source_id: String,
    pub source_alliance: Alliance,
    /// Damage before cover and degradation are applied at impact.
    pub damage: f64,
    /// Position of the shooter when fired (cover is evaluated against it).
    pub origin: Position,
    pub position: Position,
    /// Unit direction of travel.
    pub direction: Position,
    pub speed: f64,
    pub traveled: f64,
    pub max_range: f64,
}

/// Cover state refreshed once per tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CoverCache {
    /// Target sits inside at least one cover object's radius.
    pub in_cover: bool,
}

/// Degradation factor refreshed once per tick (1.0 = pristine).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DegradationCache {
    pub factor: f64,
}

impl Default for DegradationCache {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

/// Marks a target recently hit; cleared once simulation time passes `until`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnderFire {
    pub until: f64,
    /// Where the last incoming shot came from.
    pub source: Position,
}

/// Behavior-driven multipliers applied on top of degradation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BehaviorModifiers {
    pub speed_scale: f64,
    pub cooldown_scale: f64,
}

impl Default for BehaviorModifiers {
    fn default() -> Self {
        Self {
            speed_scale: 1.0,
            cooldown_scale: 1.0,
        }
    }
}

/// Marks a target whose actions are owned by an external controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalTrack {
    pub source: String,
    /// Simulation time of the last mirrored report.
    pub last_report_secs: f64,
}

/// The controller's current waypoint is a temporary maneuver point;
/// the rest of the route resumes once it is passed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Detour {
    pub point: Position,
}
