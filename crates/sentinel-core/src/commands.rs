//! Commands sent from external collaborators to the simulation.
//!
//! Commands are queued and processed at the next tick boundary, so
//! producers on other threads never touch entity state directly.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

/// Parameters for placing a new target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Explicit id; generated from the asset type when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub alliance: Alliance,
    pub asset_type: AssetType,
    pub position: Position,
    #[serde(default)]
    pub waypoints: Vec<Position>,
    #[serde(default)]
    pub loop_waypoints: bool,
}

impl TargetSpec {
    pub fn new(alliance: Alliance, asset_type: AssetType, position: Position) -> Self {
        Self {
            id: None,
            name: None,
            alliance,
            asset_type,
            position,
            waypoints: Vec::new(),
            loop_waypoints: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Position>, loop_waypoints: bool) -> Self {
        self.waypoints = waypoints;
        self.loop_waypoints = loop_waypoints;
        self
    }
}

/// One report from a real robot or external tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotTelemetry {
    pub target_id: String,
    pub position: Position,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub fsm_state: Option<UnitState>,
}

/// All possible external actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // --- Registry ---
    AddTarget(TargetSpec),
    RemoveTarget { target_id: String },
    Dispatch { target_id: String, destination: Position },

    // --- Squads ---
    FormSquad {
        member_ids: Vec<String>,
        formation: FormationKind,
    },
    ReformSquad {
        squad_id: String,
        formation: FormationKind,
    },
    OrderSquad { squad_id: String, order: SquadOrder },
    DispatchSquad {
        squad_id: String,
        destination: Position,
    },
    RallySquad { squad_id: String, point: Position },
    ScatterSquad { squad_id: String },

    // --- Environment ---
    SpawnHazard {
        kind: HazardKind,
        position: Position,
        radius: f64,
        duration: f64,
    },
    ClearHazards,
    SetThreatLevel { level: Option<ThreatLevel> },

    // --- External control ---
    BindExternalTrack { target_id: String, source: String },
    UnbindExternalTrack { target_id: String },
    Telemetry(RobotTelemetry),

    // --- Game ---
    BeginWar,
    ResetGame,
}
