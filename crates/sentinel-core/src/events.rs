//! Events emitted by the simulation onto the publish/subscribe bus.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::state::{EntitySnapshot, HazardTelemetry};
use crate::types::Position;

/// Bus topic an event is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    WaveStart,
    WaveComplete,
    GameOver,
    ThreatEscalation,
    TargetEliminated,
    ProjectileFired,
    HazardSpawned,
    HazardExpired,
    RobotFsmStateChange,
    SimTelemetry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    WaveStart {
        wave: usize,
        name: String,
        hostile_count: u32,
    },
    WaveComplete {
        wave: usize,
        eliminations: u32,
        escaped: u32,
    },
    GameOver {
        victory: bool,
        waves_completed: usize,
        eliminations: u32,
    },
    ThreatEscalation {
        from: ThreatLevel,
        to: ThreatLevel,
    },
    TargetEliminated {
        target_id: String,
        killer_id: Option<String>,
        position: Position,
    },
    ProjectileFired {
        projectile_id: u64,
        source_id: String,
        target_id: String,
        position: Position,
        aim: Position,
    },
    HazardSpawned {
        hazard_id: String,
        kind: HazardKind,
        position: Position,
        radius: f64,
        duration: f64,
    },
    HazardExpired {
        hazard_id: String,
    },
    RobotFsmStateChange {
        target_id: String,
        from: UnitState,
        to: UnitState,
        forced: bool,
    },
    SimTelemetry {
        targets: Vec<EntitySnapshot>,
        hazards: Vec<HazardTelemetry>,
    },
}

impl SimEvent {
    pub fn topic(&self) -> Topic {
        match self {
            SimEvent::WaveStart { .. } => Topic::WaveStart,
            SimEvent::WaveComplete { .. } => Topic::WaveComplete,
            SimEvent::GameOver { .. } => Topic::GameOver,
            SimEvent::ThreatEscalation { .. } => Topic::ThreatEscalation,
            SimEvent::TargetEliminated { .. } => Topic::TargetEliminated,
            SimEvent::ProjectileFired { .. } => Topic::ProjectileFired,
            SimEvent::HazardSpawned { .. } => Topic::HazardSpawned,
            SimEvent::HazardExpired { .. } => Topic::HazardExpired,
            SimEvent::RobotFsmStateChange { .. } => Topic::RobotFsmStateChange,
            SimEvent::SimTelemetry { .. } => Topic::SimTelemetry,
        }
    }
}

/// An event stamped with the tick that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub tick: u64,
    pub time_secs: f64,
    #[serde(flatten)]
    pub event: SimEvent,
}

impl EventEnvelope {
    pub fn topic(&self) -> Topic {
        self.event.topic()
    }
}
