//! Cleanup system: removes targets in a terminal status and spent projectiles.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use sentinel_core::enums::TargetStatus;
use sentinel_core::target::Target;

/// Despawn everything queued in `despawn_buffer` plus every terminal target.
/// Returns the removed targets' ids and final statuses, in id order.
pub fn run(
    world: &mut World,
    index: &mut BTreeMap<String, Entity>,
    despawn_buffer: &mut Vec<Entity>,
) -> Vec<(String, TargetStatus)> {
    let mut removed = Vec::new();
    for (entity, target) in world.query_mut::<&Target>() {
        if target.status().is_terminal() {
            despawn_buffer.push(entity);
            removed.push((target.id.clone(), target.status()));
        }
    }
    removed.sort_by(|a, b| a.0.cmp(&b.0));

    for (id, _) in &removed {
        index.remove(id);
    }
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    removed
}
