//! Combat: spawning projectiles, flying them, resolving hits.

use hecs::{Entity, World};

use sentinel_ai::npc::{MemoryKind, Stimulus};
use sentinel_core::components::{Projectile, UnderFire};
use sentinel_core::constants::*;
use sentinel_core::enums::Alliance;
use sentinel_core::events::SimEvent;
use sentinel_core::target::Target;
use sentinel_core::types::Position;
use sentinel_nav::geometry::closest_point_on_segment;

use crate::cover::CoverSystem;
use crate::degradation::{can_fire, damage_factor};
use crate::systems::behavior::FireRequest;

/// Spawn a projectile for every valid fire request.
pub fn fire(
    world: &mut World,
    requests: Vec<FireRequest>,
    now: f64,
    next_projectile_id: &mut u64,
    events: &mut Vec<SimEvent>,
    stimuli: &mut Vec<Stimulus>,
) {
    for request in requests {
        let shot = {
            let Ok(mut shooter) = world.get::<&mut Target>(request.shooter) else {
                continue;
            };
            let hf = shooter.health_fraction();
            let Some(weapon) = shooter.weapon else {
                continue;
            };
            if !shooter.is_alive() || !can_fire(hf) {
                continue;
            }
            let origin = shooter.position;
            let (dx, dy) = (request.aim.x - origin.x, request.aim.y - origin.y);
            let len = (dx * dx + dy * dy).sqrt();
            if !(len.is_finite() && len > 0.0) {
                continue;
            }
            shooter.last_fired = Some(now);
            *next_projectile_id += 1;
            Projectile {
                id: *next_projectile_id,
                source_id: shooter.id.clone(),
                source_alliance: shooter.alliance(),
                damage: weapon.damage * damage_factor(hf),
                origin,
                position: origin,
                direction: Position::new(dx / len, dy / len),
                speed: weapon.projectile_speed,
                traveled: 0.0,
                max_range: weapon.range * PROJECTILE_RANGE_FACTOR,
            }
        };

        tracing::trace!(projectile_id = shot.id, source = %shot.source_id, "projectile fired");
        events.push(SimEvent::ProjectileFired {
            projectile_id: shot.id,
            source_id: shot.source_id.clone(),
            target_id: request.target_id,
            position: shot.origin,
            aim: request.aim,
        });
        stimuli.push(Stimulus {
            kind: MemoryKind::WeaponDischarge,
            position: shot.origin,
            source_id: Some(shot.source_id.clone()),
            time: now,
        });
        world.spawn((shot,));
    }
}

struct Hit {
    projectile: Entity,
    target: Entity,
    source_id: String,
    origin: Position,
    damage: f64,
}

/// Advance projectiles; resolve collisions with the nearest opposing target
/// along each step. Spent projectiles go to `despawn_buffer`.
pub fn advance(
    world: &mut World,
    dt: f64,
    now: f64,
    cover: &CoverSystem,
    events: &mut Vec<SimEvent>,
    stimuli: &mut Vec<Stimulus>,
    despawn_buffer: &mut Vec<Entity>,
) {
    let mut candidates: Vec<(Entity, String, Position, Alliance)> = world
        .query::<&Target>()
        .iter()
        .filter(|(_, t)| t.is_alive())
        .map(|(e, t)| (e, t.id.clone(), t.position, t.alliance()))
        .collect();
    candidates.sort_by(|a, b| a.1.cmp(&b.1));

    let mut hits = Vec::new();
    for (entity, projectile) in world.query_mut::<&mut Projectile>() {
        if projectile.traveled >= projectile.max_range {
            continue;
        }
        let step = (projectile.speed * dt).min(projectile.max_range - projectile.traveled).max(0.0);
        let from = projectile.position;
        let to = Position::new(
            from.x + projectile.direction.x * step,
            from.y + projectile.direction.y * step,
        );

        let struck = candidates
            .iter()
            .filter(|(_, _, _, alliance)| projectile.source_alliance.opposes(*alliance))
            .filter_map(|(e, _, p, _)| {
                let closest = closest_point_on_segment(*p, from, to);
                (closest.distance_to(p) <= PROJECTILE_HIT_RADIUS).then(|| (*e, from.distance_to(&closest)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((target, _)) = struck {
            projectile.traveled = projectile.max_range;
            hits.push(Hit {
                projectile: entity,
                target,
                source_id: projectile.source_id.clone(),
                origin: projectile.origin,
                damage: projectile.damage,
            });
            continue;
        }

        projectile.position = to;
        projectile.traveled += step;
        if projectile.traveled >= projectile.max_range || step <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    for hit in hits {
        despawn_buffer.push(hit.projectile);
        let Ok(mut target) = world.get::<&mut Target>(hit.target) else {
            continue;
        };
        if !target.is_alive() {
            continue;
        }
        let bonus = cover.bonus(target.position, hit.origin);
        let eliminated = target.apply_damage(hit.damage * (1.0 - bonus));
        let (id, position) = (target.id.clone(), target.position);
        drop(target);

        let _ = world.insert_one(
            hit.target,
            UnderFire {
                until: now + UNDER_FIRE_WINDOW_SECS,
                source: hit.origin,
            },
        );
        if eliminated {
            tracing::debug!(target_id = %id, killer = %hit.source_id, "target eliminated");
            events.push(SimEvent::TargetEliminated {
                target_id: id,
                killer_id: Some(hit.source_id.clone()),
                position,
            });
            stimuli.push(Stimulus {
                kind: MemoryKind::Elimination,
                position,
                source_id: Some(hit.source_id),
                time: now,
            });
        }
    }
}
