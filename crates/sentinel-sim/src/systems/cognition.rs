//! Cognition system: feeds combat stimuli to NPC brains, turns their
//! fallback actions into movement, and checks for radicalization.

use std::collections::BTreeMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use sentinel_ai::npc::{Brain, NpcAction, NpcState, Stimulus};
use sentinel_ai::{CognitionLayer, UnitFsm, UnitRole};
use sentinel_core::components::{BehaviorModifiers, ExternalTrack};
use sentinel_core::constants::*;
use sentinel_core::enums::ThreatLevel;
use sentinel_core::target::Target;
use sentinel_core::types::Position;
use sentinel_nav::{MotionController, Pathfinder};

use crate::cover::CoverSystem;
use crate::world_setup::random_point_in_disc;

/// Read-only surroundings handed to the cognition pass.
pub struct Surroundings<'a> {
    pub pathfinder: Pathfinder<'a>,
    pub cover: &'a CoverSystem,
    pub defended_point: Position,
    pub threat_level: ThreatLevel,
}

/// Returns the ids of targets radicalized this tick.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    index: &BTreeMap<String, Entity>,
    cognition: &mut CognitionLayer,
    stimuli: &mut Vec<Stimulus>,
    rng: &mut ChaCha8Rng,
    surroundings: &Surroundings,
    now: f64,
    dt: f64,
) -> Vec<String> {
    if cognition.is_empty() {
        stimuli.clear();
        return Vec::new();
    }

    let positions: BTreeMap<String, Position> = cognition
        .iter()
        .filter_map(|(id, _)| {
            let entity = *index.get(id)?;
            let target = world.get::<&Target>(entity).ok()?;
            target.is_alive().then(|| (id.clone(), target.position))
        })
        .collect();

    for stimulus in stimuli.drain(..) {
        cognition.broadcast(&stimulus, &positions);
    }

    for (id, update) in cognition.tick(now, dt, &positions) {
        let (Some(&entity), Some(brain)) = (index.get(&id), cognition.get(&id)) else {
            continue;
        };
        tracing::trace!(target_id = %id, from = update.from.as_str(), to = update.to.as_str(), "npc state");
        act(world, entity, brain, update.action, rng, surroundings);
    }

    keep_moving(world, index, cognition, rng, surroundings);
    radicalize(world, index, cognition, surroundings, now)
}

/// Turn one fallback action into a route and a speed modifier.
fn act(
    world: &mut World,
    entity: Entity,
    brain: &Brain,
    action: NpcAction,
    rng: &mut ChaCha8Rng,
    surroundings: &Surroundings,
) {
    let Ok(target) = world.get::<&Target>(entity) else {
        return;
    };
    let (position, asset_type) = (target.position, target.asset_type);
    drop(target);

    let destination = match action {
        NpcAction::Flee | NpcAction::Panic | NpcAction::Evade => {
            let mut away = match brain.memory.last_danger_position() {
                Some(danger) if danger.distance_to(&position) > 0.0 => danger.bearing_to(&position),
                _ => rng.gen_range(0.0..360.0),
            };
            if action == NpcAction::Panic {
                away += rng.gen_range(-45.0..45.0);
            }
            Some(position.offset_by_heading(away, NPC_FLEE_DISTANCE))
        }
        NpcAction::Hide => surroundings.cover.nearest(position).map(|c| c.center),
        NpcAction::Investigate => brain
            .memory
            .last_position()
            .or_else(|| Some(random_point_in_disc(rng, position, NPC_WANDER_RADIUS))),
        NpcAction::Walk | NpcAction::Drive | NpcAction::Wander | NpcAction::Follow => {
            Some(random_point_in_disc(rng, position, NPC_WANDER_RADIUS))
        }
        _ => None,
    };

    let speed_scale = if matches!(action, NpcAction::Flee | NpcAction::Panic | NpcAction::Evade) {
        NPC_FLEE_SPEED_SCALE
    } else {
        1.0
    };
    if let Ok(mut modifiers) = world.get::<&mut BehaviorModifiers>(entity) {
        modifiers.speed_scale = speed_scale;
    }

    if let Ok(mut controller) = world.get::<&mut MotionController>(entity) {
        match destination {
            Some(to) if !action.is_stationary() || action == NpcAction::Hide => {
                let route = surroundings.pathfinder.plan(position, to, asset_type);
                controller.set_path(route, false);
            }
            _ => controller.stop(),
        }
    }
}

fn is_roaming(state: NpcState) -> bool {
    matches!(
        state,
        NpcState::Walking
            | NpcState::Driving
            | NpcState::Wandering
            | NpcState::Curious
            | NpcState::Following
    )
}

/// Roaming agents that ran out of route pick another point nearby.
fn keep_moving(
    world: &mut World,
    index: &BTreeMap<String, Entity>,
    cognition: &CognitionLayer,
    rng: &mut ChaCha8Rng,
    surroundings: &Surroundings,
) {
    for (id, brain) in cognition.iter() {
        if brain.is_bound() || brain.is_radicalized() || !is_roaming(brain.state()) {
            continue;
        }
        let Some(&entity) = index.get(id) else {
            continue;
        };
        if world.get::<&ExternalTrack>(entity).is_ok() {
            continue;
        }
        let Ok(mut query) = world.query_one::<(&Target, &mut MotionController)>(entity) else {
            continue;
        };
        let Some((target, controller)) = query.get() else {
            continue;
        };
        if !target.is_alive() || controller.current_waypoint().is_some() {
            continue;
        }
        let to = random_point_in_disc(rng, target.position, NPC_WANDER_RADIUS);
        let route = surroundings.pathfinder.plan(target.position, to, target.asset_type);
        controller.set_path(route, false);
    }
}

fn radicalize(
    world: &mut World,
    index: &BTreeMap<String, Entity>,
    cognition: &mut CognitionLayer,
    surroundings: &Surroundings,
    now: f64,
) -> Vec<String> {
    if !surroundings.threat_level.is_highest() {
        return Vec::new();
    }
    let candidates: Vec<String> = cognition
        .iter()
        .filter(|(_, b)| !b.is_radicalized())
        .map(|(id, _)| id.clone())
        .collect();

    let mut flipped = Vec::new();
    for id in candidates {
        let Some(&entity) = index.get(&id) else {
            continue;
        };
        let route = {
            let Ok(mut target) = world.get::<&mut Target>(entity) else {
                continue;
            };
            if !target.is_alive()
                || !cognition.check_radicalization(&id, &mut target, surroundings.threat_level, now)
            {
                continue;
            }
            let route = surroundings.pathfinder.plan(
                target.position,
                surroundings.defended_point,
                target.asset_type,
            );
            target.objective = None;
            route
        };

        let _ = world.insert_one(entity, UnitFsm::new(UnitRole::Hostile, now));
        if let Ok(mut modifiers) = world.get::<&mut BehaviorModifiers>(entity) {
            *modifiers = BehaviorModifiers::default();
        }
        if let Ok(mut controller) = world.get::<&mut MotionController>(entity) {
            controller.set_path(route, false);
        }
        flipped.push(id);
    }
    flipped
}
