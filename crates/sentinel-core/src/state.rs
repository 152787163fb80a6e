//! Snapshots handed to external collaborators.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::EventEnvelope;
use crate::types::{Position, SimTime};

/// Public view of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: String,
    pub name: String,
    pub alliance: Alliance,
    pub asset_type: AssetType,
    pub position: Position,
    /// Degrees, 0 = North, clockwise.
    pub heading: f64,
    pub speed: f64,
    pub battery: f64,
    pub health: f64,
    pub status: TargetStatus,
    pub is_combatant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsm_state: Option<String>,
}

/// Active hazard exported to telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardTelemetry {
    pub hazard_id: String,
    pub kind: HazardKind,
    pub position: Position,
    pub radius: f64,
    pub remaining_secs: f64,
}

/// Squad view for collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadSnapshot {
    pub squad_id: String,
    pub leader_id: String,
    pub member_ids: Vec<String>,
    pub formation: FormationKind,
}

/// Game mode progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub state: GameState,
    /// 1-based index of the current wave (0 before the first).
    pub wave: usize,
    pub total_waves: usize,
    pub wave_name: Option<String>,
    pub eliminations: u32,
    pub escaped: u32,
    pub hostiles_remaining: usize,
    pub threat_level: ThreatLevel,
}

/// Complete visible state after one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub game: GameView,
    pub targets: Vec<EntitySnapshot>,
    pub hazards: Vec<HazardTelemetry>,
    pub squads: Vec<SquadSnapshot>,
    /// Events flushed during this tick.
    pub events: Vec<EventEnvelope>,
}
