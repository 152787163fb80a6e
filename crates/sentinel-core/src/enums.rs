//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Side classification driving targeting and combat rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alliance {
    Friendly,
    Hostile,
    Neutral,
    #[default]
    Unknown,
}

impl Alliance {
    /// Whether `other` is a legitimate combat target for this side.
    pub fn opposes(self, other: Alliance) -> bool {
        matches!(
            (self, other),
            (Alliance::Friendly, Alliance::Hostile) | (Alliance::Hostile, Alliance::Friendly)
        )
    }

    /// Whether a change from `self` to `to` is a defined transition.
    /// Unknown contacts may be classified; neutrals may radicalize.
    pub fn can_transition_to(self, to: Alliance) -> bool {
        if self == to {
            return true;
        }
        match self {
            Alliance::Unknown => true,
            Alliance::Neutral => to == Alliance::Hostile,
            Alliance::Friendly | Alliance::Hostile => false,
        }
    }
}

/// Asset type tag for a simulated agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Rover,
    Tank,
    Apc,
    Drone,
    ScoutDrone,
    Turret,
    HeavyTurret,
    MissileTurret,
    Camera,
    Sensor,
    Person,
    HostileVehicle,
    Vehicle,
    Animal,
}

/// Behavior strategy family an asset type dispatches to when friendly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorCategory {
    Turret,
    Drone,
    Rover,
    /// Hostile combatants of any asset type share one stateful strategy.
    Hostile,
    /// Sensors and non-combatants take no combat decisions.
    Passive,
}

/// Cognition family for non-combatant agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcKind {
    Pedestrian,
    Vehicle,
    Animal,
}

impl AssetType {
    pub const ALL: [AssetType; 14] = [
        AssetType::Rover,
        AssetType::Tank,
        AssetType::Apc,
        AssetType::Drone,
        AssetType::ScoutDrone,
        AssetType::Turret,
        AssetType::HeavyTurret,
        AssetType::MissileTurret,
        AssetType::Camera,
        AssetType::Sensor,
        AssetType::Person,
        AssetType::HostileVehicle,
        AssetType::Vehicle,
        AssetType::Animal,
    ];

    /// Mobile types own a motion controller; stationary ones never do.
    pub fn is_mobile(self) -> bool {
        !matches!(
            self,
            AssetType::Turret
                | AssetType::HeavyTurret
                | AssetType::MissileTurret
                | AssetType::Camera
                | AssetType::Sensor
        )
    }

    /// Aerial types ignore roads and building obstacles.
    pub fn is_aerial(self) -> bool {
        matches!(self, AssetType::Drone | AssetType::ScoutDrone)
    }

    /// Battery-powered robots drain charge while moving.
    pub fn is_battery_powered(self) -> bool {
        matches!(
            self,
            AssetType::Rover | AssetType::Drone | AssetType::ScoutDrone | AssetType::Apc
        )
    }

    pub fn behavior_category(self) -> BehaviorCategory {
        match self {
            AssetType::Turret | AssetType::HeavyTurret | AssetType::MissileTurret => {
                BehaviorCategory::Turret
            }
            AssetType::Drone | AssetType::ScoutDrone => BehaviorCategory::Drone,
            AssetType::Rover | AssetType::Tank | AssetType::Apc => BehaviorCategory::Rover,
            _ => BehaviorCategory::Passive,
        }
    }

    /// Cognition family when this type is simulated as a non-combatant.
    pub fn npc_kind(self) -> Option<NpcKind> {
        match self {
            AssetType::Person => Some(NpcKind::Pedestrian),
            AssetType::Vehicle => Some(NpcKind::Vehicle),
            AssetType::Animal => Some(NpcKind::Animal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Rover => "rover",
            AssetType::Tank => "tank",
            AssetType::Apc => "apc",
            AssetType::Drone => "drone",
            AssetType::ScoutDrone => "scout_drone",
            AssetType::Turret => "turret",
            AssetType::HeavyTurret => "heavy_turret",
            AssetType::MissileTurret => "missile_turret",
            AssetType::Camera => "camera",
            AssetType::Sensor => "sensor",
            AssetType::Person => "person",
            AssetType::HostileVehicle => "hostile_vehicle",
            AssetType::Vehicle => "vehicle",
            AssetType::Animal => "animal",
        }
    }
}

/// Lifecycle status of a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Active,
    #[default]
    Idle,
    Stationary,
    Arrived,
    Escaped,
    Eliminated,
    LowBattery,
    Neutralized,
}

impl TargetStatus {
    /// Terminal statuses precede removal from the registry.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TargetStatus::Escaped | TargetStatus::Eliminated | TargetStatus::Neutralized
        )
    }

    /// Terminal statuses are final; everything else may change freely.
    pub fn can_transition_to(self, to: TargetStatus) -> bool {
        self == to || !self.is_terminal()
    }
}

/// Squad formation shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationKind {
    #[default]
    Wedge,
    Line,
    Column,
    Circle,
}

/// Area-denial hazard type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Fire,
    Flood,
    Roadblock,
    Smoke,
}

impl HazardKind {
    pub const ALL: [HazardKind; 4] = [
        HazardKind::Fire,
        HazardKind::Flood,
        HazardKind::Roadblock,
        HazardKind::Smoke,
    ];
}

/// Ambient escalation tier, lowest to highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    #[default]
    Green,
    Yellow,
    Orange,
    Red,
}

impl ThreatLevel {
    pub fn is_highest(self) -> bool {
        self == ThreatLevel::Red
    }
}

/// Game mode state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    Setup,
    Countdown,
    Active,
    WaveComplete,
    Victory,
    Defeat,
}

impl GameState {
    pub fn is_over(self) -> bool {
        matches!(self, GameState::Victory | GameState::Defeat)
    }
}

/// Behavioral mode of a combat unit (turret, robot, hostile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Idle,
    Scanning,
    Tracking,
    Engaging,
    Cooldown,
    Patrolling,
    Returning,
    Spawning,
    Advancing,
    Flanking,
    Retreating,
}

impl UnitState {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitState::Idle => "idle",
            UnitState::Scanning => "scanning",
            UnitState::Tracking => "tracking",
            UnitState::Engaging => "engaging",
            UnitState::Cooldown => "cooldown",
            UnitState::Patrolling => "patrolling",
            UnitState::Returning => "returning",
            UnitState::Spawning => "spawning",
            UnitState::Advancing => "advancing",
            UnitState::Flanking => "flanking",
            UnitState::Retreating => "retreating",
        }
    }
}

/// Squad-wide standing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "order", rename_all = "snake_case")]
pub enum SquadOrder {
    /// Stop in place.
    Hold,
    /// Loop through the given waypoints keeping formation.
    Patrol { waypoints: Vec<crate::types::Position> },
}
