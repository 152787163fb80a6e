//! Fixed turret behavior: scan, track, engage, cool down.

use sentinel_core::constants::TRACKING_RANGE_FACTOR;
use sentinel_core::enums::UnitState;

use super::targeting::{lead_aim, nearest_enemy};
use super::{Decision, FireOrder, Strategy, UnitView, WorldView};

pub struct TurretStrategy;

impl Strategy for TurretStrategy {
    fn decide(&mut self, unit: &UnitView, world: &WorldView) -> Decision {
        let Some(weapon) = unit.weapon else {
            return Decision::new(UnitState::Scanning);
        };

        if let Some(enemy) = nearest_enemy(unit, world.units, weapon.range, world.obstacles) {
            if !unit.weapon_ready {
                return Decision::new(UnitState::Cooldown);
            }
            let mut decision = Decision::new(UnitState::Engaging);
            decision.fire = Some(FireOrder {
                target_id: enemy.id.clone(),
                aim: lead_aim(unit.position, enemy, weapon.projectile_speed),
            });
            return decision;
        }

        let tracking_range = weapon.range * TRACKING_RANGE_FACTOR;
        if nearest_enemy(unit, world.units, tracking_range, world.obstacles).is_some() {
            Decision::new(UnitState::Tracking)
        } else {
            Decision::new(UnitState::Scanning)
        }
    }
}
