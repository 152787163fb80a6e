//! Behavior Coordinator.
//!
//! Each combat unit is handed to the strategy for its category: turrets,
//! drones and rovers are stateless, hostiles share one stateful strategy.
//! The coordinator returns one `Decision` per unit; the engine applies them.

pub mod drone;
pub mod hostile;
pub mod rover;
pub mod targeting;
pub mod turret;

use sentinel_core::enums::{Alliance, AssetType, BehaviorCategory, UnitState};
use sentinel_core::profiles::Weapon;
use sentinel_core::types::Position;
use sentinel_nav::Obstacles;

pub use drone::DroneStrategy;
pub use hostile::HostileStrategy;
pub use rover::RoverStrategy;
pub use turret::TurretStrategy;

/// Read-only view of one live unit for a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    pub id: String,
    pub alliance: Alliance,
    pub asset_type: AssetType,
    pub position: Position,
    pub heading: f64,
    pub speed: f64,
    pub health_fraction: f64,
    pub weapon: Option<Weapon>,
    pub is_combatant: bool,
    /// Cooldown elapsed and degradation allows firing.
    pub weapon_ready: bool,
    pub in_cover: bool,
    /// Source of fire received within the under-fire window.
    pub under_fire: Option<Position>,
    /// Has a path to follow.
    pub moving: bool,
}

impl UnitView {
    pub fn new(
        id: impl Into<String>,
        alliance: Alliance,
        asset_type: AssetType,
        position: Position,
    ) -> Self {
        let weapon = sentinel_core::profiles::profile(asset_type).weapon;
        Self {
            id: id.into(),
            alliance,
            asset_type,
            position,
            heading: 0.0,
            speed: 0.0,
            health_fraction: 1.0,
            weapon,
            is_combatant: weapon.is_some()
                && matches!(alliance, Alliance::Friendly | Alliance::Hostile),
            weapon_ready: weapon.is_some(),
            in_cover: false,
            under_fire: None,
            moving: false,
        }
    }
}

/// Everything a strategy may look at besides the unit itself.
pub struct WorldView<'a> {
    pub time: f64,
    pub dt: f64,
    pub units: &'a [UnitView],
    pub obstacles: &'a Obstacles,
    /// Point the friendly side defends; hostiles advance on it.
    pub defended_point: Position,
}

/// Shot request handed to combat.
#[derive(Debug, Clone, PartialEq)]
pub struct FireOrder {
    pub target_id: String,
    /// Lead-corrected aim point.
    pub aim: Position,
}

/// Output of one strategy call for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub state: UnitState,
    pub fire: Option<FireOrder>,
    /// Temporary point to visit before resuming the current route.
    pub detour: Option<Position>,
    pub speed_scale: f64,
    pub cooldown_scale: f64,
}

impl Decision {
    pub fn new(state: UnitState) -> Self {
        Self {
            state,
            fire: None,
            detour: None,
            speed_scale: 1.0,
            cooldown_scale: 1.0,
        }
    }
}

/// One per-category behavior. Implementations decide for a single unit.
pub trait Strategy {
    fn decide(&mut self, unit: &UnitView, world: &WorldView) -> Decision;
}

/// Composes all per-type strategies behind one call.
pub struct BehaviorCoordinator {
    turret: TurretStrategy,
    drone: DroneStrategy,
    rover: RoverStrategy,
    hostile: HostileStrategy,
    obstacles: Obstacles,
    defended_point: Position,
    time: f64,
}

impl BehaviorCoordinator {
    pub fn new(seed: u64, defended_point: Position) -> Self {
        Self {
            turret: TurretStrategy,
            drone: DroneStrategy,
            rover: RoverStrategy,
            hostile: HostileStrategy::new(seed),
            obstacles: Obstacles::default(),
            defended_point,
            time: 0.0,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn obstacles(&self) -> &Obstacles {
        &self.obstacles
    }

    pub fn set_obstacles(&mut self, obstacles: Obstacles) {
        self.hostile.set_obstacles(obstacles.clone());
        self.obstacles = obstacles;
    }

    pub fn set_defended_point(&mut self, p: Position) {
        self.defended_point = p;
    }

    pub fn hostile(&self) -> &HostileStrategy {
        &self.hostile
    }

    /// Drop all per-unit memory (hostile timers and sets).
    pub fn clear_state(&mut self) {
        self.hostile.clear_state();
        self.time = 0.0;
    }

    /// Forget a single unit that left the registry.
    pub fn forget(&mut self, id: &str) {
        self.hostile.forget(id);
    }

    /// Advance the internal clock by `dt` and decide for every combatant.
    pub fn tick(&mut self, dt: f64, units: &[UnitView]) -> Vec<(String, Decision)> {
        self.time += dt;
        self.decide_at(self.time, dt, units)
    }

    /// Decide for every combatant at an externally supplied time.
    /// Units are visited in id order so stateful choices replay identically.
    pub fn decide_at(&mut self, time: f64, dt: f64, units: &[UnitView]) -> Vec<(String, Decision)> {
        self.time = time;
        let world = WorldView {
            time,
            dt,
            units,
            obstacles: &self.obstacles,
            defended_point: self.defended_point,
        };

        let mut order: Vec<&UnitView> = units.iter().filter(|u| u.is_combatant).collect();
        order.sort_by(|a, b| a.id.cmp(&b.id));

        let mut out = Vec::with_capacity(order.len());
        for unit in order {
            let decision = match unit.alliance {
                Alliance::Hostile => self.hostile.decide(unit, &world),
                Alliance::Friendly => match unit.asset_type.behavior_category() {
                    BehaviorCategory::Turret => self.turret.decide(unit, &world),
                    BehaviorCategory::Drone => self.drone.decide(unit, &world),
                    BehaviorCategory::Rover => self.rover.decide(unit, &world),
                    _ => continue,
                },
                _ => continue,
            };
            out.push((unit.id.clone(), decision));
        }
        out
    }
}
