//! Motion integration: controllers advance, targets mirror them.

use hecs::World;

use sentinel_core::components::{BehaviorModifiers, DegradationCache, ExternalTrack};
use sentinel_core::constants::*;
use sentinel_core::enums::{Alliance, TargetStatus};
use sentinel_core::error::{SimError, SimResult};
use sentinel_core::target::Target;
use sentinel_nav::MotionController;

use crate::degradation::speed_at_factor;

/// Advance every live, internally driven controller by `dt`.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (target, controller, modifiers, degradation, external)) in world.query_mut::<(
        &mut Target,
        &mut MotionController,
        &BehaviorModifiers,
        &DegradationCache,
        Option<&ExternalTrack>,
    )>() {
        if !target.is_alive() || external.is_some() {
            continue;
        }
        if let Err(err) = step(target, controller, degradation.factor, modifiers.speed_scale, dt) {
            tracing::warn!(target_id = %target.id, %err, "motion step skipped");
        }
    }
}

fn step(
    target: &mut Target,
    controller: &mut MotionController,
    degradation: f64,
    speed_scale: f64,
    dt: f64,
) -> SimResult<()> {
    let low_battery =
        target.asset_type.is_battery_powered() && target.battery() < LOW_BATTERY_THRESHOLD;
    let battery_factor = if low_battery { LOW_BATTERY_SPEED_FACTOR } else { 1.0 };
    controller.max_speed =
        speed_at_factor(target.base_speed, degradation) * speed_scale.max(0.0) * battery_factor;

    let (position, heading) = (controller.position, controller.heading);
    controller.tick(dt);
    if !(controller.position.is_finite() && controller.heading.is_finite() && controller.speed.is_finite()) {
        controller.position = position;
        controller.heading = heading;
        controller.speed = 0.0;
        controller.stop();
        return Err(SimError::NonFinite(target.id.clone()));
    }

    target.position = controller.position;
    target.heading = controller.heading;
    target.speed = controller.speed;
    target.waypoints = controller.remaining_waypoints().to_vec();
    target.loop_waypoints = controller.is_looping();

    if target.asset_type.is_battery_powered() && target.base_speed > 0.0 {
        let effort = (controller.speed / target.base_speed).clamp(0.0, 2.0);
        target.drain_battery(BATTERY_DRAIN_PER_SEC * effort * dt);
    }
    target.refresh_motion_status(controller.is_arrived());

    let escaped = target.alliance() == Alliance::Hostile
        && controller.is_arrived()
        && target
            .objective
            .is_some_and(|exit| controller.position.distance_to(&exit) <= controller.arrival_tolerance);
    if escaped {
        target.set_status(TargetStatus::Escaped)?;
        tracing::debug!(target_id = %target.id, "hostile escaped");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::enums::AssetType;
    use sentinel_core::types::Position;

    use crate::world_setup::spawn_target;

    #[test]
    fn test_single_waypoint_dispatch_arrives() {
        let mut world = World::new();
        let mut t = Target::new("r", "r", Alliance::Friendly, AssetType::Rover, Position::ORIGIN);
        t.waypoints = vec![Position::new(0.0, 10.0)];
        let e = spawn_target(&mut world, t, 0.0);
        for _ in 0..200 {
            run(&mut world, 0.1);
        }
        let t = world.get::<&Target>(e).unwrap();
        assert_eq!(t.status(), TargetStatus::Arrived);
        assert!(t.position.distance_to(&Position::new(0.0, 10.0)) <= ARRIVAL_TOLERANCE + 1e-9);
        assert!(t.battery() < 1.0 && t.battery() >= 0.0);
    }

    #[test]
    fn test_looping_patrol_never_arrives() {
        let mut world = World::new();
        let mut t = Target::new("d", "d", Alliance::Friendly, AssetType::Drone, Position::ORIGIN);
        t.waypoints = vec![Position::new(0.0, 10.0), Position::new(10.0, 10.0)];
        t.loop_waypoints = true;
        let e = spawn_target(&mut world, t, 0.0);
        for _ in 0..600 {
            run(&mut world, 0.1);
            assert_ne!(world.get::<&Target>(e).unwrap().status(), TargetStatus::Arrived);
        }
    }

    #[test]
    fn test_hostile_reaching_exit_escapes() {
        let mut world = World::new();
        let mut t = Target::new("h", "h", Alliance::Hostile, AssetType::Person, Position::ORIGIN);
        t.waypoints = vec![Position::new(0.0, 3.0)];
        t.objective = Some(Position::new(0.0, 3.0));
        let e = spawn_target(&mut world, t, 0.0);
        for _ in 0..100 {
            run(&mut world, 0.1);
        }
        assert_eq!(world.get::<&Target>(e).unwrap().status(), TargetStatus::Escaped);
    }

    #[test]
    fn test_zero_speed_scale_holds_position() {
        let mut world = World::new();
        let mut t = Target::new("r", "r", Alliance::Friendly, AssetType::Rover, Position::ORIGIN);
        t.waypoints = vec![Position::new(0.0, 10.0)];
        let e = spawn_target(&mut world, t, 0.0);
        world.get::<&mut BehaviorModifiers>(e).unwrap().speed_scale = 0.0;
        for _ in 0..20 {
            run(&mut world, 0.1);
        }
        let t = world.get::<&Target>(e).unwrap();
        assert_eq!(t.position, Position::ORIGIN);
        assert_eq!(t.status(), TargetStatus::Stationary);
        assert!(world.get::<&DegradationCache>(e).is_ok());
    }

    #[test]
    fn test_speed_cap_follows_cached_degradation() {
        let mut world = World::new();
        let mut t = Target::new("r", "r", Alliance::Friendly, AssetType::Rover, Position::ORIGIN);
        t.waypoints = vec![Position::new(0.0, 50.0)];
        let base = t.base_speed;
        let e = spawn_target(&mut world, t, 0.0);
        world.get::<&mut DegradationCache>(e).unwrap().factor = 0.0;
        run(&mut world, 0.1);
        let cap = world.get::<&MotionController>(e).unwrap().max_speed;
        assert!((cap - base * MIN_SPEED_FACTOR).abs() < 1e-9);
    }
}
