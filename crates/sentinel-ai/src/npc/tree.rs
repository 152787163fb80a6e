//! Fallback decision tree used when no external controller owns a brain.
//!
//! Pure function of the brain's levels, personality and current state.

use serde::{Deserialize, Serialize};

use sentinel_core::constants::*;
use sentinel_core::enums::NpcKind;

use super::fsm::NpcState;
use super::personality::Personality;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcAction {
    Walk,
    Pause,
    Observe,
    Investigate,
    Flee,
    Hide,
    Panic,
    Drive,
    Stop,
    Yield,
    Evade,
    Park,
    Wander,
    Rest,
    Startle,
    Follow,
}

impl NpcAction {
    /// State the FSM should be in while performing this action.
    pub fn state(self) -> NpcState {
        match self {
            NpcAction::Walk => NpcState::Walking,
            NpcAction::Pause => NpcState::Pausing,
            NpcAction::Observe => NpcState::Observing,
            NpcAction::Investigate => NpcState::Curious,
            NpcAction::Flee => NpcState::Fleeing,
            NpcAction::Hide => NpcState::Hiding,
            NpcAction::Panic => NpcState::Panicking,
            NpcAction::Drive => NpcState::Driving,
            NpcAction::Stop => NpcState::Stopped,
            NpcAction::Yield => NpcState::Yielding,
            NpcAction::Evade => NpcState::Evading,
            NpcAction::Park => NpcState::Parked,
            NpcAction::Wander => NpcState::Wandering,
            NpcAction::Rest => NpcState::Resting,
            NpcAction::Startle => NpcState::Startled,
            NpcAction::Follow => NpcState::Following,
        }
    }

    /// Actions that keep the agent in place.
    pub fn is_stationary(self) -> bool {
        matches!(
            self,
            NpcAction::Pause
                | NpcAction::Observe
                | NpcAction::Hide
                | NpcAction::Stop
                | NpcAction::Yield
                | NpcAction::Park
                | NpcAction::Rest
                | NpcAction::Startle
        )
    }
}

pub struct TreeInput {
    pub kind: NpcKind,
    pub personality: Personality,
    pub danger: f64,
    pub interest: f64,
    pub state: NpcState,
    pub time_in_state: f64,
}

pub fn decide(input: &TreeInput) -> NpcAction {
    let p = input.personality;
    // Cautious agents react to less; curious ones notice more.
    let flee_at = FLEE_DANGER * (1.0 - 0.5 * p.caution);
    let curious_at = CURIOUS_INTEREST * (1.5 - p.curiosity);
    let danger = input.danger;
    let interest = input.interest;

    match input.kind {
        NpcKind::Pedestrian => {
            if danger >= PANIC_DANGER {
                NpcAction::Panic
            } else if danger >= flee_at {
                if p.caution > 0.6 {
                    NpcAction::Hide
                } else {
                    NpcAction::Flee
                }
            } else if danger >= flee_at * 0.5 {
                NpcAction::Observe
            } else if interest >= curious_at {
                NpcAction::Investigate
            } else {
                rest_cycle(input, NpcState::Pausing, NpcAction::Pause, NpcAction::Walk)
            }
        }
        NpcKind::Vehicle => {
            let parked = input.state == NpcState::Parked;
            if parked && input.time_in_state < VEHICLE_PARKED_SECS {
                NpcAction::Park
            } else if danger >= flee_at {
                NpcAction::Evade
            } else if danger >= flee_at * 0.5 {
                NpcAction::Yield
            } else if interest >= curious_at {
                if input.state == NpcState::Stopped
                    && input.time_in_state >= VEHICLE_PARK_AFTER_SECS
                {
                    NpcAction::Park
                } else {
                    NpcAction::Stop
                }
            } else {
                NpcAction::Drive
            }
        }
        NpcKind::Animal => {
            if danger >= flee_at {
                NpcAction::Flee
            } else if danger >= flee_at * 0.5 {
                NpcAction::Startle
            } else if interest >= curious_at && p.sociability > 0.5 {
                NpcAction::Follow
            } else {
                rest_cycle(input, NpcState::Resting, NpcAction::Rest, NpcAction::Wander)
            }
        }
    }
}

/// Calm agents alternate between moving and resting on fixed timers.
fn rest_cycle(input: &TreeInput, resting: NpcState, rest: NpcAction, moving: NpcAction) -> NpcAction {
    if input.state == resting {
        if input.time_in_state < NPC_REST_SECS {
            rest
        } else {
            moving
        }
    } else if input.state == moving.state() && input.time_in_state >= NPC_RESTLESS_SECS {
        rest
    } else {
        moving
    }
}
