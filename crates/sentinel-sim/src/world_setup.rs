//! Entity spawn factories for populating the battlespace.
//!
//! Every target gets the cache components the systems expect; mobile
//! types get a motion controller and combatants a unit state machine.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use sentinel_ai::npc::{Brain, CognitionLayer, Personality};
use sentinel_ai::{UnitFsm, UnitRole};
use sentinel_core::components::*;
use sentinel_core::constants::*;
use sentinel_core::enums::{Alliance, AssetType};
use sentinel_core::profiles::profile;
use sentinel_core::target::Target;
use sentinel_core::types::Position;
use sentinel_nav::{MotionController, Pathfinder};

use crate::config::WaveConfig;

/// Spawn a target with its component bundle.
pub fn spawn_target(world: &mut World, target: Target, now: f64) -> Entity {
    let controller = target.asset_type.is_mobile().then(|| {
        let mut c = MotionController::from_profile(target.position, &profile(target.asset_type));
        c.max_speed = target.base_speed;
        c.heading = target.heading;
        if !target.waypoints.is_empty() {
            c.set_path(target.waypoints.clone(), target.loop_waypoints);
        }
        c
    });
    let role = UnitRole::for_unit(target.alliance(), target.asset_type);

    let entity = world.spawn((
        target,
        CoverCache::default(),
        DegradationCache::default(),
        BehaviorModifiers::default(),
    ));
    if let Some(controller) = controller {
        let _ = world.insert_one(entity, controller);
    }
    if let Some(role) = role {
        let _ = world.insert_one(entity, UnitFsm::new(role, now));
    }
    entity
}

/// `count` points evenly spaced on a circle, the first due north.
pub fn ring_positions(center: Position, radius: f64, count: usize) -> Vec<Position> {
    (0..count)
        .map(|i| center.offset_by_heading(360.0 * i as f64 / count as f64, radius))
        .collect()
}

/// Spawn points for one wave: a random sector, `distance` from the defended point.
pub fn hostile_spawn_positions(
    rng: &mut ChaCha8Rng,
    count: usize,
    defended_point: Position,
    distance: f64,
) -> Vec<Position> {
    let base: f64 = rng.gen_range(0.0..360.0);
    (0..count)
        .map(|_| {
            let bearing = base + rng.gen_range(-HOSTILE_SPAWN_SPREAD_DEG..=HOSTILE_SPAWN_SPREAD_DEG);
            defended_point.offset_by_heading(bearing, distance)
        })
        .collect()
}

/// Where a hostile leaves the map after crossing the defended point.
pub fn exit_point(spawn: Position, defended_point: Position, map_radius: f64) -> Position {
    let through = spawn.bearing_to(&defended_point);
    defended_point.offset_by_heading(through, map_radius * EXIT_DISTANCE_FACTOR)
}

/// Spawn one wave hostile: multipliers applied, routed through the
/// defended point and out the far side.
#[allow(clippy::too_many_arguments)]
pub fn spawn_hostile(
    world: &mut World,
    id: String,
    wave: &WaveConfig,
    position: Position,
    defended_point: Position,
    map_radius: f64,
    pathfinder: &Pathfinder,
    now: f64,
) -> Entity {
    let name = format!("{} {}", wave.name, id);
    let mut target = Target::new(id, name, Alliance::Hostile, wave.asset_type, position);
    target.base_speed *= wave.speed_multiplier;
    target.scale_health(wave.health_multiplier);
    target.heading = position.bearing_to(&defended_point);

    let exit = exit_point(position, defended_point, map_radius);
    let mut route = pathfinder.plan(position, defended_point, wave.asset_type);
    route.extend(pathfinder.plan(defended_point, exit, wave.asset_type));
    target.waypoints = route;
    target.objective = Some(exit);

    spawn_target(world, target, now)
}

/// Weighted pick of an ambient NPC type.
pub fn random_npc_type(rng: &mut ChaCha8Rng) -> AssetType {
    match rng.gen_range(0..20) {
        0..=11 => AssetType::Person,
        12..=16 => AssetType::Vehicle,
        _ => AssetType::Animal,
    }
}

/// Spawn a neutral non-combatant and attach a brain with a seeded personality.
/// Types without a cognition family get no brain.
pub fn spawn_npc(
    world: &mut World,
    cognition: &mut CognitionLayer,
    rng: &mut ChaCha8Rng,
    id: String,
    asset_type: AssetType,
    position: Position,
    now: f64,
) -> Entity {
    let name = format!("{} {}", asset_type.as_str(), id);
    let target = Target::new(id.clone(), name, Alliance::Neutral, asset_type, position);
    let entity = spawn_target(world, target, now);
    if let Some(kind) = asset_type.npc_kind() {
        cognition.insert(id, Brain::new(kind, Personality::random(rng), now));
    }
    entity
}

/// Uniform point inside a disc.
pub fn random_point_in_disc(rng: &mut ChaCha8Rng, center: Position, radius: f64) -> Position {
    let r = radius * rng.gen::<f64>().sqrt();
    center.offset_by_heading(rng.gen_range(0.0..360.0), r)
}
