//! Health-dependent performance penalties.
//!
//! With f = health / max_health, the factor is 1.0 at or above
//! `DEGRADATION_THRESHOLD` and ramps linearly to 0 at f = 0.

use sentinel_core::constants::*;

pub fn degradation_factor(health_fraction: f64) -> f64 {
    let f = health_fraction.clamp(0.0, 1.0);
    if f >= DEGRADATION_THRESHOLD {
        1.0
    } else {
        f / DEGRADATION_THRESHOLD
    }
}

pub fn effective_speed(base_speed: f64, health_fraction: f64) -> f64 {
    speed_at_factor(base_speed, degradation_factor(health_fraction))
}

pub fn effective_cooldown(base_cooldown: f64, health_fraction: f64) -> f64 {
    cooldown_at_factor(base_cooldown, degradation_factor(health_fraction))
}

/// Speed for an already computed degradation factor, e.g. from `DegradationCache`.
pub fn speed_at_factor(base_speed: f64, factor: f64) -> f64 {
    let d = factor.clamp(0.0, 1.0);
    base_speed * (MIN_SPEED_FACTOR + (1.0 - MIN_SPEED_FACTOR) * d)
}

pub fn cooldown_at_factor(base_cooldown: f64, factor: f64) -> f64 {
    let d = factor.clamp(0.0, 1.0);
    base_cooldown * (1.0 + (1.0 - d))
}

/// Multiplier on outgoing damage.
pub fn damage_factor(health_fraction: f64) -> f64 {
    let d = degradation_factor(health_fraction);
    MIN_DAMAGE_FACTOR + (1.0 - MIN_DAMAGE_FACTOR) * d
}

/// Firing is allowed down to exactly `FIRE_DISABLE_THRESHOLD`.
pub fn can_fire(health_fraction: f64) -> bool {
    health_fraction >= FIRE_DISABLE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_curve() {
        assert_eq!(effective_speed(10.0, 1.0), 10.0);
        assert_eq!(effective_speed(10.0, 0.5), 10.0);
        assert!((effective_speed(10.0, 0.25) - 7.0).abs() < 1e-12);
        assert!((effective_speed(10.0, 0.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_cooldown_doubles_at_zero_health() {
        assert_eq!(effective_cooldown(1.5, 0.8), 1.5);
        assert!((effective_cooldown(1.5, 0.25) - 2.25).abs() < 1e-12);
        assert!((effective_cooldown(1.5, 0.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fire_threshold_boundary() {
        assert!(can_fire(0.10));
        assert!(!can_fire(0.09));
        assert!(can_fire(20.0 / 200.0));
    }

    #[test]
    fn test_factor_forms_agree() {
        let d = degradation_factor(0.25);
        assert_eq!(speed_at_factor(10.0, d), effective_speed(10.0, 0.25));
        assert_eq!(cooldown_at_factor(1.5, d), effective_cooldown(1.5, 0.25));
        assert_eq!(speed_at_factor(10.0, -1.0), speed_at_factor(10.0, 0.0));
    }

    #[test]
    fn test_damage_factor_range() {
        assert_eq!(damage_factor(1.0), 1.0);
        assert!((damage_factor(0.0) - MIN_DAMAGE_FACTOR).abs() < 1e-12);
    }
}
