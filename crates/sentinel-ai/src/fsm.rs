//! Combat unit state machine.
//!
//! `transition` applies the role's guard table and is what the behavior
//! system uses for internally computed decisions. `force_state` skips the
//! guard entirely; it exists for mirroring a state reported by an external
//! controller, which is authoritative.

use serde::{Deserialize, Serialize};

use sentinel_core::enums::{Alliance, AssetType, BehaviorCategory, UnitState};
use sentinel_core::error::{SimError, SimResult};

/// Which state set a unit's machine runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRole {
    Turret,
    Mobile,
    Hostile,
}

impl UnitRole {
    /// Role for a combatant, or `None` for units that never run a machine.
    pub fn for_unit(alliance: Alliance, asset_type: AssetType) -> Option<UnitRole> {
        match alliance {
            Alliance::Hostile => Some(UnitRole::Hostile),
            Alliance::Friendly => match asset_type.behavior_category() {
                BehaviorCategory::Turret => Some(UnitRole::Turret),
                BehaviorCategory::Drone | BehaviorCategory::Rover => Some(UnitRole::Mobile),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn initial_state(self) -> UnitState {
        match self {
            UnitRole::Turret | UnitRole::Mobile => UnitState::Idle,
            UnitRole::Hostile => UnitState::Spawning,
        }
    }

    pub fn states(self) -> &'static [UnitState] {
        use UnitState::*;
        match self {
            UnitRole::Turret => &[Idle, Scanning, Tracking, Engaging, Cooldown],
            UnitRole::Mobile => &[Idle, Patrolling, Engaging, Returning],
            UnitRole::Hostile => &[Spawning, Advancing, Engaging, Flanking, Retreating],
        }
    }

    /// Guard table for internally driven transitions.
    pub fn allows(self, from: UnitState, to: UnitState) -> bool {
        use UnitState::*;
        if from == to {
            return true;
        }
        if !self.states().contains(&to) {
            return false;
        }
        match self {
            UnitRole::Turret => match from {
                Idle => to == Scanning,
                Scanning => matches!(to, Tracking | Engaging | Idle),
                Tracking => matches!(to, Engaging | Scanning | Cooldown),
                Engaging => matches!(to, Cooldown | Tracking | Scanning),
                Cooldown => matches!(to, Engaging | Tracking | Scanning),
                _ => false,
            },
            UnitRole::Mobile => self.states().contains(&from),
            UnitRole::Hostile => match from {
                Spawning => matches!(to, Advancing | Engaging),
                Advancing => matches!(to, Engaging | Flanking | Retreating),
                Engaging => matches!(to, Advancing | Flanking | Retreating),
                Flanking => matches!(to, Advancing | Engaging | Retreating),
                Retreating => matches!(to, Advancing | Engaging),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFsm {
    role: UnitRole,
    state: UnitState,
    /// Simulation time the current state was entered.
    entered_at: f64,
}

impl UnitFsm {
    pub fn new(role: UnitRole, now: f64) -> Self {
        Self {
            role,
            state: role.initial_state(),
            entered_at: now,
        }
    }

    pub fn role(&self) -> UnitRole {
        self.role
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn time_in_state(&self, now: f64) -> f64 {
        (now - self.entered_at).max(0.0)
    }

    /// Guarded transition. Returns the previous state when the state changed.
    pub fn transition(&mut self, to: UnitState, now: f64) -> SimResult<Option<UnitState>> {
        if to == self.state {
            return Ok(None);
        }
        if !self.role.allows(self.state, to) {
            return Err(SimError::InvalidTransition {
                from: self.state.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(Some(self.set(to, now)))
    }

    /// Unguarded transition for externally mirrored state.
    /// Returns the previous state when the state changed.
    pub fn force_state(&mut self, to: UnitState, now: f64) -> Option<UnitState> {
        if to == self.state {
            return None;
        }
        Some(self.set(to, now))
    }

    fn set(&mut self, to: UnitState, now: f64) -> UnitState {
        let from = self.state;
        self.state = to;
        self.entered_at = now;
        from
    }
}
