//! Scenario presets: wave schedules and initial force layouts.

use serde::{Deserialize, Serialize};

use sentinel_core::commands::TargetSpec;
use sentinel_core::enums::{Alliance, AssetType};
use sentinel_core::types::Position;

use crate::config::{SimConfig, WaveConfig};
use crate::engine::SimulationEngine;
use crate::world_setup::ring_positions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Three escalating waves against a turret ring with roving support.
    Defense,
    /// One wave of three infantry against five turrets on a small map.
    Skirmish,
}

/// Default 3-wave schedule with escalating difficulty.
pub fn default_waves() -> Vec<WaveConfig> {
    vec![
        WaveConfig::new("Probe", 3),
        WaveConfig::new("Assault", 6).with_multipliers(1.1, 1.2),
        WaveConfig {
            asset_type: AssetType::HostileVehicle,
            ..WaveConfig::new("Armored Push", 3).with_multipliers(1.0, 1.5)
        },
    ]
}

pub fn skirmish_waves() -> Vec<WaveConfig> {
    vec![WaveConfig::new("Skirmish", 3)]
}

impl Scenario {
    /// Config for this scenario with the given seed.
    pub fn config(self, seed: u64) -> SimConfig {
        let mut config = SimConfig {
            seed,
            ..SimConfig::default()
        };
        match self {
            Scenario::Defense => {
                config.map_radius = 120.0;
                config.game.waves = default_waves();
            }
            Scenario::Skirmish => {
                config.map_radius = 40.0;
                config.game.spawn_distance_fraction = 0.4;
                config.game.waves = skirmish_waves();
            }
        }
        config
    }

    /// Place the friendly force.
    pub fn populate(self, engine: &mut SimulationEngine) {
        let centre = engine.config().defended_point;
        match self {
            Scenario::Defense => {
                for (i, p) in ring_positions(centre, 15.0, 4).into_iter().enumerate() {
                    let asset_type = if i % 2 == 0 {
                        AssetType::Turret
                    } else {
                        AssetType::HeavyTurret
                    };
                    engine.add_target(TargetSpec::new(Alliance::Friendly, asset_type, p));
                    engine.add_cover(p, 3.0, 0.6);
                }
                engine.add_target(TargetSpec::new(Alliance::Friendly, AssetType::MissileTurret, centre));
                let patrol = ring_positions(centre, 25.0, 4);
                for start in [0usize, 2] {
                    let mut route = patrol.clone();
                    route.rotate_left(start);
                    engine.add_target(
                        TargetSpec::new(Alliance::Friendly, AssetType::Rover, route[0])
                            .with_waypoints(route, true),
                    );
                }
                let orbit = ring_positions(centre, 35.0, 8);
                engine.add_target(
                    TargetSpec::new(Alliance::Friendly, AssetType::Drone, orbit[0])
                        .with_waypoints(orbit, true),
                );
            }
            Scenario::Skirmish => {
                for p in ring_positions(centre, 10.0, 5) {
                    engine.add_target(TargetSpec::new(Alliance::Friendly, AssetType::Turret, p));
                }
            }
        }
    }
}

/// Build and populate an engine for a scenario.
pub fn build(scenario: Scenario, seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::new(scenario.config(seed));
    scenario.populate(&mut engine);
    engine
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_waves_escalate() {
        let waves = default_waves();
        assert_eq!(waves.len(), 3);
        assert!(waves[1].hostile_count > waves[0].hostile_count);
        assert_eq!(waves[2].asset_type, AssetType::HostileVehicle);
    }

    #[test]
    fn test_skirmish_places_five_turrets() {
        let engine = build(Scenario::Skirmish, 1);
        let turrets = engine
            .targets()
            .into_iter()
            .filter(|t| t.asset_type == AssetType::Turret)
            .count();
        assert_eq!(turrets, 5);
    }
}
