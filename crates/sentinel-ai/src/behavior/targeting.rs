//! Target selection shared by every strategy.

use sentinel_core::types::Position;
use sentinel_nav::Obstacles;

use super::UnitView;

/// Nearest opposing unit within `range` that `unit` can see.
/// Ties are broken by id. Aerial shooters ignore building obstacles.
pub fn nearest_enemy<'a>(
    unit: &UnitView,
    units: &'a [UnitView],
    range: f64,
    obstacles: &Obstacles,
) -> Option<&'a UnitView> {
    units
        .iter()
        .filter(|o| o.id != unit.id && unit.alliance.opposes(o.alliance))
        .map(|o| (o, unit.position.distance_to(&o.position)))
        .filter(|(_, d)| *d <= range)
        .filter(|(o, _)| {
            unit.asset_type.is_aerial()
                || !obstacles.blocks_line_of_sight(unit.position, o.position)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)))
        .map(|(o, _)| o)
}

/// Nearest opposing unit at any range, ignoring line of sight.
pub fn nearest_contact<'a>(unit: &UnitView, units: &'a [UnitView]) -> Option<(&'a UnitView, f64)> {
    nearest_enemy(unit, units, f64::INFINITY, &Obstacles::default())
        .map(|o| (o, unit.position.distance_to(&o.position)))
}

/// Aim point leading a moving target by the projectile's flight time.
pub fn lead_aim(shooter: Position, target: &UnitView, projectile_speed: f64) -> Position {
    if projectile_speed <= 0.0 || target.speed <= 0.0 {
        return target.position;
    }
    let flight = shooter.distance_to(&target.position) / projectile_speed;
    target
        .position
        .offset_by_heading(target.heading, target.speed * flight)
}
