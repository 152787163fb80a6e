//! Behavior system: builds unit views, runs the coordinator and applies
//! its decisions to state machines, modifiers and routes.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use sentinel_ai::{BehaviorCoordinator, Decision, UnitFsm, UnitRole, UnitView};
use sentinel_core::components::*;
use sentinel_core::enums::UnitState;
use sentinel_core::events::SimEvent;
use sentinel_core::target::Target;
use sentinel_core::types::Position;
use sentinel_nav::MotionController;

use crate::degradation::{can_fire, cooldown_at_factor};

/// A shot the combat system should spawn this tick.
#[derive(Debug, Clone)]
pub struct FireRequest {
    pub shooter: Entity,
    pub target_id: String,
    pub aim: Position,
}

pub fn run(
    world: &mut World,
    coordinator: &mut BehaviorCoordinator,
    now: f64,
    dt: f64,
    events: &mut Vec<SimEvent>,
) -> Vec<FireRequest> {
    clear_passed_detours(world);

    let (views, entities) = build_views(world, now);
    let decisions = coordinator.decide_at(now, dt, &views);

    let mut requests = Vec::new();
    for (id, decision) in decisions {
        let Some(&entity) = entities.get(&id) else {
            continue;
        };
        if world.get::<&ExternalTrack>(entity).is_ok() {
            continue;
        }
        if let Some(fire) = apply(world, entity, &id, &decision, now, events) {
            requests.push(fire);
        }
    }
    requests
}

/// Views of every live target, plus the id -> entity map for applying decisions.
fn build_views(world: &World, now: f64) -> (Vec<UnitView>, BTreeMap<String, Entity>) {
    let mut views = Vec::new();
    let mut entities = BTreeMap::new();
    let mut query = world.query::<(
        &Target,
        &CoverCache,
        &DegradationCache,
        &BehaviorModifiers,
        Option<&UnderFire>,
        Option<&MotionController>,
    )>();
    for (entity, (target, cover, degradation, modifiers, under_fire, controller)) in query.iter() {
        if !target.is_alive() {
            continue;
        }
        let hf = target.health_fraction();
        let weapon_ready = target.weapon.is_some_and(|w| {
            let cooldown = cooldown_at_factor(w.cooldown, degradation.factor) * modifiers.cooldown_scale;
            can_fire(hf) && target.last_fired.map_or(true, |t| now - t >= cooldown)
        });
        views.push(UnitView {
            id: target.id.clone(),
            alliance: target.alliance(),
            asset_type: target.asset_type,
            position: target.position,
            heading: target.heading,
            speed: target.speed,
            health_fraction: hf,
            weapon: target.weapon,
            is_combatant: target.is_combatant(),
            weapon_ready,
            in_cover: cover.in_cover,
            under_fire: under_fire.filter(|u| now < u.until).map(|u| u.source),
            moving: controller.is_some_and(|c| c.current_waypoint().is_some()),
        });
        entities.insert(target.id.clone(), entity);
    }
    views.sort_by(|a, b| a.id.cmp(&b.id));
    (views, entities)
}

fn apply(
    world: &mut World,
    entity: Entity,
    id: &str,
    decision: &Decision,
    now: f64,
    events: &mut Vec<SimEvent>,
) -> Option<FireRequest> {
    if let Ok(mut fsm) = world.get::<&mut UnitFsm>(entity) {
        if let Some((from, to)) = step_toward(&mut fsm, decision.state, now) {
            events.push(SimEvent::RobotFsmStateChange {
                target_id: id.to_string(),
                from,
                to,
                forced: false,
            });
        }
    }

    if let Ok(mut modifiers) = world.get::<&mut BehaviorModifiers>(entity) {
        modifiers.speed_scale = decision.speed_scale;
        modifiers.cooldown_scale = decision.cooldown_scale;
    }

    if let Some(point) = decision.detour {
        let installed = match world.get::<&mut MotionController>(entity) {
            Ok(mut controller) => {
                let route = if controller.is_looping() {
                    vec![point]
                } else {
                    std::iter::once(point)
                        .chain(controller.remaining_waypoints().iter().copied())
                        .collect()
                };
                controller.set_path(route, false);
                true
            }
            Err(_) => false,
        };
        if installed {
            let _ = world.insert_one(entity, Detour { point });
        }
    }

    decision.fire.as_ref().map(|fire| FireRequest {
        shooter: entity,
        target_id: fire.target_id.clone(),
        aim: fire.aim,
    })
}

/// Guarded move toward `wanted`. When the guard forbids a direct change,
/// take one step through a state that bridges the two.
fn step_toward(fsm: &mut UnitFsm, wanted: UnitState, now: f64) -> Option<(UnitState, UnitState)> {
    let role: UnitRole = fsm.role();
    let from = fsm.state();
    let next = if role.allows(from, wanted) {
        wanted
    } else {
        *role
            .states()
            .iter()
            .find(|&&mid| role.allows(from, mid) && role.allows(mid, wanted))?
    };
    match fsm.transition(next, now) {
        Ok(Some(prev)) => Some((prev, next)),
        Ok(None) => None,
        Err(err) => {
            tracing::trace!(%err, "unit transition rejected");
            None
        }
    }
}

/// Drop detour markers whose point the controller has already passed.
fn clear_passed_detours(world: &mut World) {
    let passed: Vec<Entity> = world
        .query::<(&Detour, &MotionController)>()
        .iter()
        .filter(|(_, (detour, c))| c.current_waypoint() != Some(detour.point))
        .map(|(e, _)| e)
        .collect();
    for entity in passed {
        let _ = world.remove_one::<Detour>(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::enums::{Alliance, AssetType};

    use crate::world_setup::spawn_target;

    #[test]
    fn test_turret_passes_through_scanning() {
        let mut world = World::new();
        let turret = spawn_target(
            &mut world,
            Target::new("turret-1", "t", Alliance::Friendly, AssetType::Turret, Position::ORIGIN),
            0.0,
        );
        spawn_target(
            &mut world,
            Target::new("hostile-1", "h", Alliance::Hostile, AssetType::Person, Position::new(0.0, 10.0)),
            0.0,
        );
        let mut coordinator = BehaviorCoordinator::new(1, Position::ORIGIN);
        let mut events = Vec::new();

        let shots = run(&mut world, &mut coordinator, 0.1, 0.1, &mut events);
        assert!(shots.iter().any(|s| s.shooter == turret && s.target_id == "hostile-1"));
        assert_eq!(world.get::<&UnitFsm>(turret).unwrap().state(), UnitState::Scanning);

        run(&mut world, &mut coordinator, 0.2, 0.1, &mut events);
        assert_eq!(world.get::<&UnitFsm>(turret).unwrap().state(), UnitState::Engaging);
        assert!(events.iter().all(|e| matches!(
            e,
            SimEvent::RobotFsmStateChange { forced: false, .. }
        )));
    }

    #[test]
    fn test_detour_is_prepended_and_cleared() {
        let mut world = World::new();
        let mut t = Target::new("h", "h", Alliance::Hostile, AssetType::Person, Position::ORIGIN);
        t.waypoints = vec![Position::new(0.0, 20.0)];
        let e = spawn_target(&mut world, t, 0.0);
        let mut decision = Decision::new(UnitState::Advancing);
        decision.detour = Some(Position::new(3.0, 0.0));
        apply(&mut world, e, "h", &decision, 0.0, &mut Vec::new());

        {
            let c = world.get::<&MotionController>(e).unwrap();
            assert_eq!(c.waypoints(), &[Position::new(3.0, 0.0), Position::new(0.0, 20.0)]);
        }
        assert!(world.get::<&Detour>(e).is_ok());

        world
            .get::<&mut MotionController>(e)
            .unwrap()
            .set_path(vec![Position::new(0.0, 20.0)], false);
        clear_passed_detours(&mut world);
        assert!(world.get::<&Detour>(e).is_err());
    }
}
