//! Decision making for SENTINEL.
//!
//! Combat behavior (per-asset-type strategies behind one coordinator,
//! unit state machines) and the cognition layer that drives
//! non-combatant NPCs. Operates on plain data views handed in by the
//! engine each tick; nothing here touches the ECS world.

pub mod behavior;
pub mod fsm;
pub mod npc;

pub use sentinel_core as core;

pub use behavior::{BehaviorCoordinator, Decision, FireOrder, Strategy, UnitView, WorldView};
pub use fsm::{UnitFsm, UnitRole};
pub use npc::{Brain, CognitionLayer, NpcAction, NpcState};

#[cfg(test)]
mod tests;
