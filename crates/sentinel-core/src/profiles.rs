//! Per-asset-type kinematic and weapon profiles.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::AssetType;

/// Direct-fire weapon carried by a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Maximum engagement range (map units).
    pub range: f64,
    /// Base seconds between shots.
    pub cooldown: f64,
    /// Base damage per projectile hit.
    pub damage: f64,
    /// Projectile flight speed (units/s).
    pub projectile_speed: f64,
}

/// Static parameters of an asset type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetProfile {
    /// Cruise speed at full health (units/s). Zero for fixed installations.
    pub base_speed: f64,
    pub max_health: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    /// Degrees per second.
    pub turn_rate: f64,
    pub weapon: Option<Weapon>,
}

const fn weapon(range: f64, cooldown: f64, damage: f64, projectile_speed: f64) -> Option<Weapon> {
    Some(Weapon {
        range,
        cooldown,
        damage,
        projectile_speed,
    })
}

/// Get the profile for a given asset type.
pub fn profile(asset_type: AssetType) -> AssetProfile {
    let ground = AssetProfile {
        base_speed: 0.0,
        max_health: 100.0,
        acceleration: DEFAULT_ACCELERATION,
        deceleration: DEFAULT_DECELERATION,
        turn_rate: DEFAULT_TURN_RATE,
        weapon: None,
    };

    match asset_type {
        AssetType::Rover => AssetProfile {
            base_speed: 3.0,
            max_health: 150.0,
            weapon: weapon(12.0, 1.5, 12.0, 30.0),
            ..ground
        },
        AssetType::Tank => AssetProfile {
            base_speed: 2.0,
            max_health: 400.0,
            acceleration: 1.0,
            turn_rate: 90.0,
            weapon: weapon(18.0, 3.0, 35.0, 35.0),
            ..ground
        },
        AssetType::Apc => AssetProfile {
            base_speed: 3.5,
            max_health: 250.0,
            turn_rate: 120.0,
            weapon: weapon(10.0, 1.0, 8.0, 30.0),
            ..ground
        },
        AssetType::Drone => AssetProfile {
            base_speed: 6.0,
            max_health: 60.0,
            acceleration: 4.0,
            deceleration: 6.0,
            turn_rate: 360.0,
            weapon: weapon(10.0, 1.0, 8.0, 40.0),
        },
        AssetType::ScoutDrone => AssetProfile {
            base_speed: 8.0,
            max_health: 40.0,
            acceleration: 5.0,
            deceleration: 8.0,
            turn_rate: 360.0,
            weapon: None,
        },
        AssetType::Turret => AssetProfile {
            max_health: 200.0,
            weapon: weapon(20.0, 1.5, 20.0, 40.0),
            ..ground
        },
        AssetType::HeavyTurret => AssetProfile {
            max_health: 350.0,
            weapon: weapon(25.0, 2.5, 40.0, 40.0),
            ..ground
        },
        AssetType::MissileTurret => AssetProfile {
            max_health: 250.0,
            weapon: weapon(35.0, 5.0, 60.0, 25.0),
            ..ground
        },
        AssetType::Camera | AssetType::Sensor => AssetProfile {
            max_health: 50.0,
            ..ground
        },
        AssetType::Person => AssetProfile {
            base_speed: 1.5,
            max_health: 80.0,
            acceleration: 3.0,
            deceleration: 6.0,
            turn_rate: 360.0,
            weapon: weapon(8.0, 2.0, 8.0, 30.0),
        },
        AssetType::HostileVehicle => AssetProfile {
            base_speed: 4.0,
            max_health: 200.0,
            turn_rate: 120.0,
            weapon: weapon(10.0, 1.5, 12.0, 30.0),
            ..ground
        },
        AssetType::Vehicle => AssetProfile {
            base_speed: 5.0,
            max_health: 150.0,
            turn_rate: 120.0,
            ..ground
        },
        AssetType::Animal => AssetProfile {
            base_speed: 2.5,
            max_health: 30.0,
            acceleration: 4.0,
            deceleration: 8.0,
            turn_rate: 360.0,
            weapon: None,
        },
    }
}
