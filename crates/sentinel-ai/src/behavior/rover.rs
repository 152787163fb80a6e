//! Ground robot behavior. Halts to fire, resumes its route when clear.

use sentinel_core::constants::{ARRIVAL_TOLERANCE, RETURN_HEALTH};
use sentinel_core::enums::UnitState;

use super::targeting::{lead_aim, nearest_enemy};
use super::{Decision, FireOrder, Strategy, UnitView, WorldView};

pub struct RoverStrategy;

impl Strategy for RoverStrategy {
    fn decide(&mut self, unit: &UnitView, world: &WorldView) -> Decision {
        if let Some(decision) = return_when_crippled(unit, world) {
            return decision;
        }
        let idle = if unit.moving {
            UnitState::Patrolling
        } else {
            UnitState::Idle
        };
        let Some(weapon) = unit.weapon else {
            return Decision::new(idle);
        };
        match nearest_enemy(unit, world.units, weapon.range, world.obstacles) {
            Some(enemy) => {
                let mut decision = Decision::new(UnitState::Engaging);
                decision.speed_scale = 0.0;
                if unit.weapon_ready {
                    decision.fire = Some(FireOrder {
                        target_id: enemy.id.clone(),
                        aim: lead_aim(unit.position, enemy, weapon.projectile_speed),
                    });
                }
                decision
            }
            None => Decision::new(idle),
        }
    }
}

/// Badly damaged friendly robots head back to the defended point.
pub(crate) fn return_when_crippled(unit: &UnitView, world: &WorldView) -> Option<Decision> {
    if unit.health_fraction >= RETURN_HEALTH {
        return None;
    }
    let mut decision = Decision::new(UnitState::Returning);
    if unit.position.distance_to(&world.defended_point) > ARRIVAL_TOLERANCE && !unit.moving {
        decision.detour = Some(world.defended_point);
    }
    Some(decision)
}
