//! Simulation configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use sentinel_core::constants::*;
use sentinel_core::enums::AssetType;
use sentinel_core::error::{SimError, SimResult};
use sentinel_core::types::Position;

/// One scripted batch of hostile spawns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub name: String,
    pub hostile_count: u32,
    #[serde(default = "one")]
    pub speed_multiplier: f64,
    #[serde(default = "one")]
    pub health_multiplier: f64,
    #[serde(default = "person")]
    pub asset_type: AssetType,
}

fn one() -> f64 {
    1.0
}

fn person() -> AssetType {
    AssetType::Person
}

impl WaveConfig {
    pub fn new(name: impl Into<String>, hostile_count: u32) -> Self {
        Self {
            name: name.into(),
            hostile_count,
            speed_multiplier: 1.0,
            health_multiplier: 1.0,
            asset_type: AssetType::Person,
        }
    }

    pub fn with_multipliers(mut self, speed: f64, health: f64) -> Self {
        self.speed_multiplier = speed;
        self.health_multiplier = health;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub countdown_secs: f64,
    pub wave_pause_secs: f64,
    /// Spawn distance from the defended point as a fraction of map radius.
    pub spawn_distance_fraction: f64,
    pub waves: Vec<WaveConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            wave_pause_secs: DEFAULT_WAVE_PAUSE_SECS,
            spawn_distance_fraction: DEFAULT_SPAWN_DISTANCE_FRACTION,
            waves: crate::scenario::default_waves(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    /// Ambient population spawned when the engine starts.
    pub population: usize,
    pub hearing_radius: f64,
    pub crowd_radius: f64,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            population: DEFAULT_NPC_POPULATION,
            hearing_radius: DEFAULT_HEARING_RADIUS,
            crowd_radius: DEFAULT_CROWD_RADIUS,
        }
    }
}

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub map_radius: f64,
    pub defended_point: Position,
    /// Emit `sim_telemetry` every this many ticks (0 disables it).
    pub telemetry_interval_ticks: u64,
    pub event_queue_capacity: usize,
    pub command_queue_capacity: usize,
    pub game: GameConfig,
    pub npc: NpcConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            map_radius: DEFAULT_MAP_RADIUS,
            defended_point: Position::ORIGIN,
            telemetry_interval_ticks: DEFAULT_TELEMETRY_INTERVAL_TICKS,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            command_queue_capacity: DEFAULT_COMMAND_QUEUE_CAPACITY,
            game: GameConfig::default(),
            npc: NpcConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        let config: SimConfig = toml::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.map_radius.is_finite() && self.map_radius > 0.0) {
            return Err(SimError::Config(format!("map_radius must be positive, got {}", self.map_radius)));
        }
        if !self.defended_point.is_finite() {
            return Err(SimError::Config("defended_point must be finite".into()));
        }
        if self.event_queue_capacity == 0 || self.command_queue_capacity == 0 {
            return Err(SimError::Config("queue capacities must be non-zero".into()));
        }
        for wave in &self.game.waves {
            if wave.speed_multiplier <= 0.0 || wave.health_multiplier <= 0.0 {
                return Err(SimError::Config(format!("wave '{}' has a non-positive multiplier", wave.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            seed = 7
            map_radius = 40.0

            [game]
            countdown_secs = 1.0

            [[game.waves]]
            name = "Probe"
            hostile_count = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.game.countdown_secs, 1.0);
        assert_eq!(config.game.wave_pause_secs, DEFAULT_WAVE_PAUSE_SECS);
        assert_eq!(config.game.waves.len(), 1);
        assert_eq!(config.game.waves[0].speed_multiplier, 1.0);
        assert_eq!(config.game.waves[0].asset_type, AssetType::Person);
        assert_eq!(config.npc.hearing_radius, DEFAULT_HEARING_RADIUS);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            SimConfig::from_toml_str("map_radius = -1.0"),
            Err(SimError::Config(_))
        ));
        assert!(matches!(
            SimConfig::from_toml_str("seed = \"abc\""),
            Err(SimError::Config(_))
        ));
    }
}
