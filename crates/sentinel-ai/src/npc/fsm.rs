//! Per-kind NPC state machine.

use serde::{Deserialize, Serialize};

use sentinel_core::enums::NpcKind;
use sentinel_core::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcState {
    // Pedestrian
    Walking,
    Pausing,
    Observing,
    Curious,
    Hiding,
    Panicking,
    // Vehicle
    Driving,
    Stopped,
    Yielding,
    Evading,
    Parked,
    // Animal
    Wandering,
    Resting,
    Startled,
    Following,
    // Pedestrian and animal
    Fleeing,
    /// Radicalized: the agent is now a hostile combatant.
    Spawning,
}

impl NpcState {
    pub fn as_str(self) -> &'static str {
        match self {
            NpcState::Walking => "walking",
            NpcState::Pausing => "pausing",
            NpcState::Observing => "observing",
            NpcState::Curious => "curious",
            NpcState::Hiding => "hiding",
            NpcState::Panicking => "panicking",
            NpcState::Driving => "driving",
            NpcState::Stopped => "stopped",
            NpcState::Yielding => "yielding",
            NpcState::Evading => "evading",
            NpcState::Parked => "parked",
            NpcState::Wandering => "wandering",
            NpcState::Resting => "resting",
            NpcState::Startled => "startled",
            NpcState::Following => "following",
            NpcState::Fleeing => "fleeing",
            NpcState::Spawning => "spawning",
        }
    }
}

pub fn states_for(kind: NpcKind) -> &'static [NpcState] {
    use NpcState::*;
    match kind {
        NpcKind::Pedestrian => &[Walking, Pausing, Observing, Curious, Fleeing, Hiding, Panicking],
        NpcKind::Vehicle => &[Driving, Stopped, Yielding, Evading, Parked],
        NpcKind::Animal => &[Wandering, Resting, Startled, Fleeing, Following],
    }
}

pub fn default_state(kind: NpcKind) -> NpcState {
    match kind {
        NpcKind::Pedestrian => NpcState::Walking,
        NpcKind::Vehicle => NpcState::Driving,
        NpcKind::Animal => NpcState::Wandering,
    }
}

fn allows(kind: NpcKind, from: NpcState, to: NpcState) -> bool {
    use NpcState::*;
    if from == Spawning || !states_for(kind).contains(&to) {
        return false;
    }
    // Panic has to burn off before curiosity returns; a parked car
    // has to pull out before it can evade.
    !matches!((from, to), (Panicking, Curious) | (Parked, Evading) | (Parked, Yielding))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcFsm {
    kind: NpcKind,
    state: NpcState,
    entered_at: f64,
}

impl NpcFsm {
    pub fn new(kind: NpcKind, now: f64) -> Self {
        Self {
            kind,
            state: default_state(kind),
            entered_at: now,
        }
    }

    pub fn kind(&self) -> NpcKind {
        self.kind
    }

    pub fn state(&self) -> NpcState {
        self.state
    }

    pub fn time_in_state(&self, now: f64) -> f64 {
        (now - self.entered_at).max(0.0)
    }

    /// Guarded transition. Returns the previous state when the state changed.
    pub fn transition(&mut self, to: NpcState, now: f64) -> SimResult<Option<NpcState>> {
        if to == self.state {
            return Ok(None);
        }
        if !allows(self.kind, self.state, to) {
            return Err(SimError::InvalidTransition {
                from: self.state.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(Some(self.set(to, now)))
    }

    /// Unguarded transition, for radicalization and externally owned agents.
    pub fn force_state(&mut self, to: NpcState, now: f64) -> Option<NpcState> {
        if to == self.state {
            return None;
        }
        Some(self.set(to, now))
    }

    fn set(&mut self, to: NpcState, now: f64) -> NpcState {
        let from = self.state;
        self.state = to;
        self.entered_at = now;
        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_kind() {
        assert_eq!(NpcFsm::new(NpcKind::Pedestrian, 0.0).state(), NpcState::Walking);
        assert_eq!(NpcFsm::new(NpcKind::Vehicle, 0.0).state(), NpcState::Driving);
        assert_eq!(NpcFsm::new(NpcKind::Animal, 0.0).state(), NpcState::Wandering);
    }

    #[test]
    fn test_foreign_state_rejected() {
        let mut fsm = NpcFsm::new(NpcKind::Vehicle, 0.0);
        assert!(fsm.transition(NpcState::Fleeing, 1.0).is_err());
        assert_eq!(fsm.state(), NpcState::Driving);
    }

    #[test]
    fn test_spawning_is_final_for_guarded_transitions() {
        let mut fsm = NpcFsm::new(NpcKind::Pedestrian, 0.0);
        fsm.force_state(NpcState::Spawning, 1.0);
        assert!(fsm.transition(NpcState::Walking, 2.0).is_err());
    }

    #[test]
    fn test_panic_cannot_jump_to_curious() {
        let mut fsm = NpcFsm::new(NpcKind::Pedestrian, 0.0);
        fsm.transition(NpcState::Panicking, 1.0).unwrap();
        assert!(fsm.transition(NpcState::Curious, 2.0).is_err());
        assert!(fsm.transition(NpcState::Fleeing, 2.0).is_ok());
    }
}
