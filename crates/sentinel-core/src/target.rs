//! The mutable record describing one simulated agent.
//!
//! Battery, health, alliance and status are private: they only change
//! through the mutators below, which keep them inside their domains and
//! reject undefined transitions.

use serde::{Deserialize, Serialize};

use crate::constants::LOW_BATTERY_THRESHOLD;
use crate::enums::{Alliance, AssetType, TargetStatus};
use crate::error::{SimError, SimResult};
use crate::profiles::{profile, Weapon};
use crate::state::EntitySnapshot;
use crate::types::Position;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub asset_type: AssetType,
    pub position: Position,
    /// Compass heading in degrees, [0, 360).
    pub heading: f64,
    /// Current scalar speed (units/s).
    pub speed: f64,
    /// Speed at full health before degradation and behavior scaling.
    pub base_speed: f64,
    pub waypoints: Vec<Position>,
    pub loop_waypoints: bool,
    pub squad_id: Option<String>,
    pub weapon: Option<Weapon>,
    /// Simulation time of the last shot.
    pub last_fired: Option<f64>,
    /// Final destination hostiles return to after a tactical maneuver.
    pub objective: Option<Position>,
    alliance: Alliance,
    status: TargetStatus,
    battery: f64,
    health: f64,
    max_health: f64,
    is_combatant: bool,
}

impl Target {
    /// Build a target with the default profile of its asset type.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        alliance: Alliance,
        asset_type: AssetType,
        position: Position,
    ) -> Self {
        let p = profile(asset_type);
        let is_combatant = p.weapon.is_some()
            && matches!(alliance, Alliance::Friendly | Alliance::Hostile);
        let status = if asset_type.is_mobile() {
            TargetStatus::Idle
        } else {
            TargetStatus::Stationary
        };
        Self {
            id: id.into(),
            name: name.into(),
            asset_type,
            position,
            heading: 0.0,
            speed: 0.0,
            base_speed: p.base_speed,
            waypoints: Vec::new(),
            loop_waypoints: false,
            squad_id: None,
            weapon: p.weapon,
            last_fired: None,
            objective: None,
            alliance,
            status,
            battery: 1.0,
            health: p.max_health,
            max_health: p.max_health,
            is_combatant,
        }
    }

    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn is_combatant(&self) -> bool {
        self.is_combatant
    }

    /// Health as a fraction of max health, in [0, 1].
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.status.is_terminal() && self.health > 0.0
    }

    /// Scale max health (and current health proportionally), e.g. for wave multipliers.
    pub fn scale_health(&mut self, multiplier: f64) {
        let m = multiplier.max(0.01);
        self.max_health *= m;
        self.health = (self.health * m).clamp(0.0, self.max_health);
    }

    /// Apply damage. Returns true if this hit eliminated the target.
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.status = TargetStatus::Eliminated;
            self.speed = 0.0;
            self.waypoints.clear();
            return true;
        }
        false
    }

    pub fn heal(&mut self, amount: f64) {
        if self.is_alive() {
            self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
        }
    }

    pub fn set_battery(&mut self, level: f64) {
        self.battery = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn drain_battery(&mut self, amount: f64) {
        self.set_battery(self.battery - amount.max(0.0));
    }

    pub fn set_status(&mut self, to: TargetStatus) -> SimResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(SimError::InvalidStatus {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn set_alliance(&mut self, to: Alliance) -> SimResult<()> {
        if !self.alliance.can_transition_to(to) {
            return Err(SimError::InvalidAlliance {
                from: self.alliance,
                to,
            });
        }
        self.alliance = to;
        self.is_combatant =
            self.weapon.is_some() && matches!(to, Alliance::Friendly | Alliance::Hostile);
        Ok(())
    }

    /// Flip a neutral to a hostile combatant. Arms it with its type's weapon
    /// or, failing that, the person profile's weapon.
    pub fn radicalize(&mut self) -> SimResult<()> {
        self.set_alliance(Alliance::Hostile)?;
        if self.weapon.is_none() {
            self.weapon = profile(self.asset_type)
                .weapon
                .or(profile(AssetType::Person).weapon);
        }
        self.is_combatant = true;
        Ok(())
    }

    /// Recompute movement status after a motion update.
    /// Zero speed with pending waypoints is stationary, never active.
    pub fn refresh_motion_status(&mut self, arrived: bool) {
        if self.status.is_terminal() {
            return;
        }
        if self.asset_type.is_battery_powered() && self.battery < LOW_BATTERY_THRESHOLD {
            self.status = TargetStatus::LowBattery;
            return;
        }
        self.status = if arrived {
            TargetStatus::Arrived
        } else if self.waypoints.is_empty() {
            if self.asset_type.is_mobile() {
                if self.status == TargetStatus::Arrived {
                    TargetStatus::Arrived
                } else {
                    TargetStatus::Idle
                }
            } else {
                TargetStatus::Stationary
            }
        } else if self.speed > 0.0 {
            TargetStatus::Active
        } else {
            TargetStatus::Stationary
        };
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            alliance: self.alliance,
            asset_type: self.asset_type,
            position: self.position,
            heading: self.heading,
            speed: self.speed,
            battery: self.battery,
            health: self.health,
            status: self.status,
            is_combatant: self.is_combatant,
            squad_id: self.squad_id.clone(),
            fsm_state: None,
        }
    }
}
