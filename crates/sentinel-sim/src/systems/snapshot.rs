//! Snapshot system: builds read-only views of the world.

use hecs::{Entity, World};

use sentinel_ai::{CognitionLayer, UnitFsm};
use sentinel_core::state::EntitySnapshot;
use sentinel_core::target::Target;

/// Snapshot one entity; the FSM label comes from its unit machine or, for
/// non-combatants, its brain.
pub fn entity_snapshot(world: &World, entity: Entity, cognition: &CognitionLayer) -> Option<EntitySnapshot> {
    let target = world.get::<&Target>(entity).ok()?;
    let mut snapshot = target.snapshot();
    snapshot.fsm_state = match world.get::<&UnitFsm>(entity) {
        Ok(fsm) => Some(fsm.state().as_str().to_string()),
        Err(_) => cognition
            .get(&target.id)
            .map(|b| b.state().as_str().to_string()),
    };
    Some(snapshot)
}

/// Snapshots of every target, sorted by id.
pub fn entity_snapshots(world: &World, cognition: &CognitionLayer) -> Vec<EntitySnapshot> {
    let entities: Vec<Entity> = world.query::<&Target>().iter().map(|(e, _)| e).collect();
    let mut out: Vec<EntitySnapshot> = entities
        .into_iter()
        .filter_map(|e| entity_snapshot(world, e, cognition))
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}
