//! Time-limited area-denial zones.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use sentinel_core::constants::*;
use sentinel_core::enums::HazardKind;
use sentinel_core::events::SimEvent;
use sentinel_core::state::HazardTelemetry;
use sentinel_core::types::Position;
use sentinel_nav::Zone;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: String,
    pub kind: HazardKind,
    pub center: Position,
    pub radius: f64,
    pub duration: f64,
    pub elapsed: f64,
    pub active: bool,
}

impl Hazard {
    pub fn remaining(&self) -> f64 {
        (self.duration - self.elapsed).max(0.0)
    }

    pub fn zone(&self) -> Zone {
        Zone::new(self.center, self.radius)
    }

    pub fn contains(&self, p: Position) -> bool {
        self.active && self.center.distance_to(&p) <= self.radius
    }
}

#[derive(Debug, Clone, Default)]
pub struct HazardManager {
    hazards: Vec<Hazard>,
    next_id: u32,
}

impl HazardManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        kind: HazardKind,
        center: Position,
        radius: f64,
        duration: f64,
        events: &mut Vec<SimEvent>,
    ) -> String {
        self.next_id += 1;
        let id = format!("hazard-{:04}", self.next_id);
        let hazard = Hazard {
            id: id.clone(),
            kind,
            center,
            radius: radius.max(0.0),
            duration: duration.max(0.0),
            elapsed: 0.0,
            active: true,
        };
        tracing::debug!(hazard_id = %id, ?kind, radius = hazard.radius, "hazard spawned");
        events.push(SimEvent::HazardSpawned {
            hazard_id: id.clone(),
            kind,
            position: center,
            radius: hazard.radius,
            duration: hazard.duration,
        });
        self.hazards.push(hazard);
        id
    }

    /// Place `count` hazards uniformly inside the disc of `radius` around `center`.
    pub fn spawn_random(
        &mut self,
        count: usize,
        center: Position,
        radius: f64,
        rng: &mut ChaCha8Rng,
        events: &mut Vec<SimEvent>,
    ) -> Vec<String> {
        (0..count)
            .map(|_| {
                let r = radius * rng.gen::<f64>().sqrt();
                let bearing = rng.gen_range(0.0..360.0);
                let at = center.offset_by_heading(bearing, r);
                let kind = HazardKind::ALL[rng.gen_range(0..HazardKind::ALL.len())];
                let size = rng.gen_range(RANDOM_HAZARD_MIN_RADIUS..RANDOM_HAZARD_MAX_RADIUS);
                let secs = rng.gen_range(RANDOM_HAZARD_MIN_SECS..RANDOM_HAZARD_MAX_SECS);
                self.spawn(kind, at, size, secs, events)
            })
            .collect()
    }

    /// Accumulate elapsed time; expire exactly when elapsed reaches duration.
    pub fn tick(&mut self, dt: f64, events: &mut Vec<SimEvent>) {
        for hazard in self.hazards.iter_mut().filter(|h| h.active) {
            hazard.elapsed += dt;
            if hazard.elapsed >= hazard.duration {
                hazard.active = false;
                tracing::debug!(hazard_id = %hazard.id, "hazard expired");
                events.push(SimEvent::HazardExpired {
                    hazard_id: hazard.id.clone(),
                });
            }
        }
        self.hazards.retain(|h| h.active);
    }

    /// Remove every hazard, reporting each as expired.
    pub fn clear(&mut self, events: &mut Vec<SimEvent>) {
        for hazard in self.hazards.drain(..) {
            events.push(SimEvent::HazardExpired {
                hazard_id: hazard.id,
            });
        }
    }

    /// Drop all state including the id counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_blocked(&self, p: Position) -> bool {
        self.hazards.iter().any(|h| h.contains(p))
    }

    pub fn active(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter().filter(|h| h.active)
    }

    pub fn active_zones(&self) -> Vec<Zone> {
        self.active().map(Hazard::zone).collect()
    }

    pub fn len(&self) -> usize {
        self.active().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_telemetry(&self) -> Vec<HazardTelemetry> {
        self.active()
            .map(|h| HazardTelemetry {
                hazard_id: h.id.clone(),
                kind: h.kind,
                position: h.center,
                radius: h.radius,
                remaining_secs: h.remaining(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_expires_exactly_at_duration() {
        let mut mgr = HazardManager::new();
        let mut events = Vec::new();
        mgr.spawn(HazardKind::Fire, Position::ORIGIN, 5.0, 1.0, &mut events);
        assert!(matches!(events[0], SimEvent::HazardSpawned { .. }));

        mgr.tick(0.5, &mut events);
        assert!(mgr.is_blocked(Position::new(1.0, 1.0)));
        assert_eq!(mgr.to_telemetry().len(), 1);
        assert!((mgr.to_telemetry()[0].remaining_secs - 0.5).abs() < 1e-12);

        mgr.tick(0.5, &mut events);
        assert!(!mgr.is_blocked(Position::new(1.0, 1.0)));
        assert!(mgr.to_telemetry().is_empty());
        assert!(matches!(events.last(), Some(SimEvent::HazardExpired { .. })));
    }

    #[test]
    fn test_outside_radius_not_blocked() {
        let mut mgr = HazardManager::new();
        mgr.spawn(HazardKind::Flood, Position::ORIGIN, 5.0, 10.0, &mut Vec::new());
        assert!(!mgr.is_blocked(Position::new(6.0, 0.0)));
    }

    #[test]
    fn test_random_hazards_stay_in_bounds() {
        let mut mgr = HazardManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let ids = mgr.spawn_random(20, Position::ORIGIN, 50.0, &mut rng, &mut Vec::new());
        assert_eq!(ids.len(), 20);
        for h in mgr.active() {
            assert!(h.center.distance_to(&Position::ORIGIN) <= 50.0 + 1e-9);
            assert!(h.radius >= RANDOM_HAZARD_MIN_RADIUS && h.radius < RANDOM_HAZARD_MAX_RADIUS);
        }
    }

    #[test]
    fn test_clear_reports_expiry() {
        let mut mgr = HazardManager::new();
        let mut events = Vec::new();
        mgr.spawn(HazardKind::Smoke, Position::ORIGIN, 2.0, 10.0, &mut events);
        mgr.clear(&mut events);
        assert!(mgr.is_empty());
        assert_eq!(events.len(), 2);
    }
}
