use serde::{Deserialize, Serialize};

use sentinel_core::constants::NPC_DECISION_INTERVAL_SECS;
use sentinel_core::enums::NpcKind;

use super::fsm::{NpcFsm, NpcState};
use super::memory::Memory;
use super::personality::Personality;
use super::tree::{self, NpcAction, TreeInput};

/// A state change the fallback tree produced for one brain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainUpdate {
    pub action: NpcAction,
    pub from: NpcState,
    pub to: NpcState,
}

/// Cognition attached to one non-combatant agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brain {
    pub personality: Personality,
    pub memory: Memory,
    fsm: NpcFsm,
    /// An external controller owns this agent's actions.
    bound: bool,
    radicalized: bool,
    next_decision_at: f64,
}

impl Brain {
    pub fn new(kind: NpcKind, personality: Personality, now: f64) -> Self {
        Self {
            personality,
            memory: Memory::new(),
            fsm: NpcFsm::new(kind, now),
            bound: false,
            radicalized: false,
            next_decision_at: now,
        }
    }

    pub fn kind(&self) -> NpcKind {
        self.fsm.kind()
    }

    pub fn state(&self) -> NpcState {
        self.fsm.state()
    }

    pub fn fsm(&self) -> &NpcFsm {
        &self.fsm
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn set_bound(&mut self, bound: bool) {
        self.bound = bound;
    }

    pub fn is_radicalized(&self) -> bool {
        self.radicalized
    }

    pub(crate) fn mark_radicalized(&mut self, now: f64) -> Option<NpcState> {
        self.radicalized = true;
        self.fsm.force_state(NpcState::Spawning, now)
    }

    /// Mirror an externally reported state, bypassing the guard.
    pub fn force_state(&mut self, to: NpcState, now: f64) -> Option<NpcState> {
        self.fsm.force_state(to, now)
    }

    /// Decay memory and, when a decision is due and nobody else owns the
    /// agent, run the fallback tree. Returns the state change, if any.
    pub fn update(&mut self, now: f64) -> Option<BrainUpdate> {
        self.memory.decay(now);
        if self.bound || self.radicalized || now < self.next_decision_at {
            return None;
        }
        self.next_decision_at = now + NPC_DECISION_INTERVAL_SECS;

        let action = tree::decide(&TreeInput {
            kind: self.kind(),
            personality: self.personality,
            danger: self.memory.danger(),
            interest: self.memory.interest(),
            state: self.fsm.state(),
            time_in_state: self.fsm.time_in_state(now),
        });
        let to = action.state();
        match self.fsm.transition(to, now) {
            Ok(Some(from)) => Some(BrainUpdate { action, from, to }),
            Ok(None) => None,
            Err(err) => {
                tracing::trace!(%err, "fallback action rejected");
                None
            }
        }
    }
}
