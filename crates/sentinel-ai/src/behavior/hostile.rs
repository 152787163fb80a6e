//! Stateful hostile behavior.
//!
//! Hostiles advance on the defended point and fight anything in range.
//! On top of that each unit may, per its own timers:
//! - dodge sideways briefly after taking fire,
//! - flank around the nearest defender once before closing in,
//! - join a group rush when enough hostiles bunch up,
//! - slow to a recon advance inside the defenders' reach,
//! - fire faster while pinned (suppress),
//! - fall back once when spotted while exposed and hurt.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sentinel_core::constants::*;
use sentinel_core::enums::{Alliance, UnitState};
use sentinel_core::types::Position;
use sentinel_nav::Obstacles;

use super::targeting::{lead_aim, nearest_contact, nearest_enemy};
use super::{Decision, FireOrder, Strategy, UnitView, WorldView};

pub struct HostileStrategy {
    rng: ChaCha8Rng,
    seed: u64,
    obstacles: Obstacles,
    dodge_until: BTreeMap<String, f64>,
    dodge_ready_at: BTreeMap<String, f64>,
    flank_until: BTreeMap<String, f64>,
    flanked: BTreeSet<String>,
    rush: BTreeSet<String>,
    rush_until: f64,
    rush_ready_at: f64,
    recon: BTreeSet<String>,
    suppressed: BTreeSet<String>,
    retreat_until: BTreeMap<String, f64>,
    retreated: BTreeSet<String>,
}

impl HostileStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            obstacles: Obstacles::default(),
            dodge_until: BTreeMap::new(),
            dodge_ready_at: BTreeMap::new(),
            flank_until: BTreeMap::new(),
            flanked: BTreeSet::new(),
            rush: BTreeSet::new(),
            rush_until: 0.0,
            rush_ready_at: 0.0,
            recon: BTreeSet::new(),
            suppressed: BTreeSet::new(),
            retreat_until: BTreeMap::new(),
            retreated: BTreeSet::new(),
        }
    }

    pub fn set_obstacles(&mut self, obstacles: Obstacles) {
        self.obstacles = obstacles;
    }

    /// Forget every timer and set, and rewind the side-choice RNG.
    pub fn clear_state(&mut self) {
        let obstacles = std::mem::take(&mut self.obstacles);
        *self = Self::new(self.seed);
        self.obstacles = obstacles;
    }

    pub fn forget(&mut self, id: &str) {
        self.dodge_until.remove(id);
        self.dodge_ready_at.remove(id);
        self.flank_until.remove(id);
        self.flanked.remove(id);
        self.rush.remove(id);
        self.recon.remove(id);
        self.suppressed.remove(id);
        self.retreat_until.remove(id);
        self.retreated.remove(id);
    }

    pub fn is_dodging(&self, id: &str, now: f64) -> bool {
        self.dodge_until.get(id).is_some_and(|&t| now < t)
    }

    pub fn is_flanking(&self, id: &str, now: f64) -> bool {
        self.flank_until.get(id).is_some_and(|&t| now < t)
    }

    pub fn is_rushing(&self, id: &str) -> bool {
        self.rush.contains(id)
    }

    pub fn is_recon(&self, id: &str) -> bool {
        self.recon.contains(id)
    }

    pub fn is_suppressing(&self, id: &str) -> bool {
        self.suppressed.contains(id)
    }

    pub fn is_retreating(&self, id: &str, now: f64) -> bool {
        self.retreat_until.get(id).is_some_and(|&t| now < t)
    }

    fn side(&mut self) -> f64 {
        if self.rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    /// Lateral point perpendicular to the incoming fire.
    fn dodge_point(&mut self, unit: &UnitView, source: Position) -> Position {
        let bearing = source.bearing_to(&unit.position);
        let side = self.side();
        unit.position
            .offset_by_heading(bearing + 90.0 * side, DODGE_DISTANCE)
    }

    /// Point swung around `pivot` at the unit's current distance, on a side
    /// free of buildings if one exists.
    fn flank_point(&mut self, unit: &UnitView, pivot: Position) -> Position {
        let bearing = pivot.bearing_to(&unit.position);
        let radius = pivot.distance_to(&unit.position);
        let side = self.side();
        let first = pivot.offset_by_heading(bearing + FLANK_ANGLE_DEG * side, radius);
        if !self.obstacles.contains(first) {
            return first;
        }
        let second = pivot.offset_by_heading(bearing - FLANK_ANGLE_DEG * side, radius);
        if !self.obstacles.contains(second) {
            second
        } else {
            unit.position
        }
    }

    fn update_rush(&mut self, unit: &UnitView, world: &WorldView) {
        if world.time >= self.rush_until && !self.rush.is_empty() {
            self.rush.clear();
            self.rush_ready_at = world.time + GROUP_RUSH_COOLDOWN_SECS;
        }
        if !self.rush.is_empty() || world.time < self.rush_ready_at {
            return;
        }
        let group: BTreeSet<String> = world
            .units
            .iter()
            .filter(|o| o.alliance == Alliance::Hostile && o.is_combatant)
            .filter(|o| o.position.distance_to(&unit.position) <= GROUP_RUSH_RADIUS)
            .map(|o| o.id.clone())
            .collect();
        if group.len() >= GROUP_RUSH_MIN_SIZE {
            tracing::debug!(leader = %unit.id, size = group.len(), "group rush");
            self.rush = group;
            self.rush_until = world.time + GROUP_RUSH_DURATION_SECS;
        }
    }
}

impl Strategy for HostileStrategy {
    fn decide(&mut self, unit: &UnitView, world: &WorldView) -> Decision {
        let now = world.time;
        let mut decision = Decision::new(UnitState::Advancing);

        // Shooting is independent of movement tactics.
        let in_range = unit
            .weapon
            .and_then(|w| nearest_enemy(unit, world.units, w.range, &self.obstacles).map(|e| (w, e)));
        if let Some((weapon, enemy)) = in_range {
            decision.state = UnitState::Engaging;
            if unit.weapon_ready {
                decision.fire = Some(FireOrder {
                    target_id: enemy.id.clone(),
                    aim: lead_aim(unit.position, enemy, weapon.projectile_speed),
                });
            }
        }
        let contact = nearest_contact(unit, world.units);

        // Suppress: pinned and able to shoot back.
        if unit.under_fire.is_some() && in_range.is_some() {
            self.suppressed.insert(unit.id.clone());
            decision.cooldown_scale = SUPPRESS_COOLDOWN_FACTOR;
        } else {
            self.suppressed.remove(&unit.id);
        }

        // Detected retreat: spotted, exposed and hurt. Once per unit.
        if self.is_retreating(&unit.id, now) {
            decision.state = UnitState::Retreating;
            decision.speed_scale = DETECTED_RETREAT_SPEED_FACTOR;
            return decision;
        }
        if let Some((spotter, dist)) = contact {
            if dist <= DETECTION_RADIUS
                && !unit.in_cover
                && unit.health_fraction < DETECTED_RETREAT_HEALTH
                && !self.retreated.contains(&unit.id)
            {
                self.retreated.insert(unit.id.clone());
                self.retreat_until
                    .insert(unit.id.clone(), now + DETECTED_RETREAT_DURATION_SECS);
                let away = spotter.position.bearing_to(&unit.position);
                decision.detour = Some(
                    unit.position
                        .offset_by_heading(away, DETECTED_RETREAT_DISTANCE),
                );
                decision.state = UnitState::Retreating;
                decision.speed_scale = DETECTED_RETREAT_SPEED_FACTOR;
                return decision;
            }
        }

        // Dodge after taking fire, rate-limited per unit.
        if let Some(source) = unit.under_fire {
            let ready = self.dodge_ready_at.get(&unit.id).copied().unwrap_or(0.0);
            if now >= ready {
                self.dodge_until
                    .insert(unit.id.clone(), now + DODGE_DURATION_SECS);
                self.dodge_ready_at
                    .insert(unit.id.clone(), now + DODGE_COOLDOWN_SECS);
                decision.detour = Some(self.dodge_point(unit, source));
                return decision;
            }
        }
        if self.is_dodging(&unit.id, now) {
            return decision;
        }

        // Group rush overrides the cautious tactics below.
        self.update_rush(unit, world);
        if self.rush.contains(&unit.id) {
            self.recon.remove(&unit.id);
            decision.speed_scale = GROUP_RUSH_SPEED_FACTOR;
            return decision;
        }

        let Some(weapon) = unit.weapon else {
            return decision;
        };

        if self.is_flanking(&unit.id, now) {
            decision.state = UnitState::Flanking;
            return decision;
        }
        if let Some((defender, dist)) = contact {
            let flank_range = weapon.range * FLANK_TRIGGER_RANGE_FACTOR;
            if in_range.is_none() && dist <= flank_range && !self.flanked.contains(&unit.id) {
                self.flanked.insert(unit.id.clone());
                self.flank_until
                    .insert(unit.id.clone(), now + FLANK_DURATION_SECS);
                decision.detour = Some(self.flank_point(unit, defender.position));
                decision.state = UnitState::Flanking;
                return decision;
            }

            if in_range.is_none() && dist <= weapon.range * RECON_RANGE_FACTOR {
                self.recon.insert(unit.id.clone());
                decision.speed_scale = RECON_SPEED_FACTOR;
                return decision;
            }
        }
        self.recon.remove(&unit.id);
        decision
    }
}
