//! Armed drone behavior. Keeps flying its route while engaging.

use sentinel_core::enums::UnitState;

use super::rover::return_when_crippled;
use super::targeting::{lead_aim, nearest_enemy};
use super::{Decision, FireOrder, Strategy, UnitView, WorldView};

pub struct DroneStrategy;

impl Strategy for DroneStrategy {
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
