//! NPC cognition layer.
//!
//! Brains are keyed by the owning target's id and visited in id order.
//! Positions are handed in each tick; the layer never owns targets.

pub mod alliance;
pub mod brain;
pub mod crowd;
pub mod fsm;
pub mod memory;
pub mod personality;
pub mod reactor;
pub mod tree;

use std::collections::BTreeMap;

use sentinel_core::enums::ThreatLevel;
use sentinel_core::target::Target;
use sentinel_core::types::Position;

pub use alliance::AllianceManager;
pub use brain::{Brain, BrainUpdate};
pub use crowd::{CrowdAgent, CrowdDynamics};
pub use fsm::{NpcFsm, NpcState};
pub use memory::{Memory, MemoryEvent, MemoryKind};
pub use personality::Personality;
pub use reactor::{EventReactor, Stimulus};
pub use tree::NpcAction;

#[derive(Debug, Clone, Default)]
pub struct CognitionLayer {
    brains: BTreeMap<String, Brain>,
    crowd: CrowdDynamics,
    reactor: EventReactor,
    alliance: AllianceManager,
}

impl CognitionLayer {
    pub fn new(hearing_radius: f64, crowd_radius: f64) -> Self {
        Self {
            brains: BTreeMap::new(),
            crowd: CrowdDynamics::new(crowd_radius),
            reactor: EventReactor::new(hearing_radius),
            alliance: AllianceManager::default(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, brain: Brain) {
        self.brains.insert(id.into(), brain);
    }

    pub fn remove(&mut self, id: &str) -> Option<Brain> {
        self.brains.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Brain> {
        self.brains.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Brain> {
        self.brains.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.brains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brains.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Brain)> {
        self.brains.iter()
    }

    pub fn clear(&mut self) {
        self.brains.clear();
        self.reactor.clear();
    }

    /// Hand a brain to (or take it back from) an external controller.
    /// Returns false for an unknown id.
    pub fn set_bound(&mut self, id: &str, bound: bool) -> bool {
        match self.brains.get_mut(id) {
            Some(brain) => {
                brain.set_bound(bound);
                true
            }
            None => false,
        }
    }

    /// Deliver one stimulus to every brain within earshot.
    /// Returns how many brains perceived it.
    pub fn broadcast(&mut self, stimulus: &Stimulus, positions: &BTreeMap<String, Position>) -> usize {
        if !self.reactor.admit(stimulus) {
            return 0;
        }
        let mut reached = 0;
        for (id, brain) in self.brains.iter_mut() {
            if brain.is_radicalized() {
                continue;
            }
            let Some(&listener) = positions.get(id) else {
                continue;
            };
            if let Some(event) = self.reactor.perceive(stimulus, listener) {
                brain.memory.record(event);
                reached += 1;
            }
        }
        reached
    }

    /// Contagion across the crowd, then one update per brain.
    pub fn tick(
        &mut self,
        now: f64,
        dt: f64,
        positions: &BTreeMap<String, Position>,
    ) -> Vec<(String, BrainUpdate)> {
        let members: Vec<(&String, CrowdAgent)> = self
            .brains
            .iter()
            .filter(|(_, b)| !b.is_radicalized())
            .filter_map(|(id, b)| {
                positions.get(id).map(|&position| {
                    (
                        id,
                        CrowdAgent {
                            position,
                            danger: b.memory.danger(),
                            interest: b.memory.interest(),
                            sociability: b.personality.sociability,
                        },
                    )
                })
            })
            .collect();
        let agents: Vec<CrowdAgent> = members.iter().map(|(_, a)| *a).collect();
        let deltas = self.crowd.deltas(dt, &agents);
        let ids: Vec<String> = members.into_iter().map(|(id, _)| id.clone()).collect();
        for (id, (danger, interest)) in ids.iter().zip(deltas) {
            if let Some(brain) = self.brains.get_mut(id) {
                brain.memory.raise_danger(danger);
                brain.memory.raise_interest(interest);
            }
        }

        self.brains
            .iter_mut()
            .filter_map(|(id, brain)| brain.update(now).map(|u| (id.clone(), u)))
            .collect()
    }

    /// Radicalization check for one brain against its owning target.
    pub fn check_radicalization(
        &mut self,
        id: &str,
        target: &mut Target,
        level: ThreatLevel,
        now: f64,
    ) -> bool {
        let alliance = self.alliance;
        match self.brains.get_mut(id) {
            Some(brain) => alliance.check(brain, target, level, now),
            None => false,
        }
    }
}
