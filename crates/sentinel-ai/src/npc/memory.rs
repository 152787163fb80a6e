//! Timestamped event log with decaying danger and interest levels.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use sentinel_core::constants::{
    DANGER_DECAY_SECS, HOSTILE_PROXIMITY_RADIUS, INTEREST_DECAY_SECS, MEMORY_CAPACITY,
};
use sentinel_core::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    WeaponDischarge,
    Elimination,
    HostileSighted,
    Hazard,
    Commotion,
}

impl MemoryKind {
    /// Whether this kind counts toward radicalization.
    pub fn is_hostile(self) -> bool {
        matches!(
            self,
            MemoryKind::WeaponDischarge | MemoryKind::Elimination | MemoryKind::HostileSighted
        )
    }

    /// (danger, interest) added at full intensity.
    fn weights(self) -> (f64, f64) {
        match self {
            MemoryKind::WeaponDischarge => (0.4, 0.3),
            MemoryKind::Elimination => (0.6, 0.4),
            MemoryKind::HostileSighted => (0.3, 0.3),
            MemoryKind::Hazard => (0.3, 0.1),
            MemoryKind::Commotion => (0.0, 0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub kind: MemoryKind,
    pub time: f64,
    pub position: Position,
    /// Distance from the NPC when perceived.
    pub distance: f64,
    /// Perceived strength in [0, 1].
    pub intensity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Memory {
    events: VecDeque<MemoryEvent>,
    danger: f64,
    interest: f64,
    last_decay: f64,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: MemoryEvent) {
        let intensity = if event.intensity.is_finite() {
            event.intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (danger, interest) = event.kind.weights();
        self.raise_danger(danger * intensity);
        self.raise_interest(interest * intensity);
        if self.events.len() == MEMORY_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(MemoryEvent { intensity, ..event });
    }

    /// Decay both levels to `now`. Time never runs backwards here.
    pub fn decay(&mut self, now: f64) {
        let elapsed = now - self.last_decay;
        if elapsed <= 0.0 {
            return;
        }
        self.danger *= (-elapsed / DANGER_DECAY_SECS).exp();
        self.interest *= (-elapsed / INTEREST_DECAY_SECS).exp();
        self.last_decay = now;
    }

    pub fn raise_danger(&mut self, amount: f64) {
        self.danger = (self.danger + amount.max(0.0)).min(1.0);
    }

    pub fn raise_interest(&mut self, amount: f64) {
        self.interest = (self.interest + amount.max(0.0)).min(1.0);
    }

    pub fn danger(&self) -> f64 {
        self.danger
    }

    pub fn interest(&self) -> f64 {
        self.interest
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &MemoryEvent> {
        self.events.iter()
    }

    /// Hostile events perceived close enough to count toward radicalization.
    pub fn hostile_event_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind.is_hostile() && e.distance <= HOSTILE_PROXIMITY_RADIUS)
            .count()
    }

    /// Where the most recent hostile or hazard event happened.
    pub fn last_danger_position(&self) -> Option<Position> {
        self.events
            .iter()
            .rev()
            .find(|e| e.kind.is_hostile() || e.kind == MemoryKind::Hazard)
            .map(|e| e.position)
    }

    /// Where the most recent event of any kind happened.
    pub fn last_position(&self) -> Option<Position> {
        self.events.back().map(|e| e.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: MemoryKind, time: f64, distance: f64) -> MemoryEvent {
        MemoryEvent {
            kind,
            time,
            position: Position::new(distance, 0.0),
            distance,
            intensity: 1.0,
        }
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut m = Memory::new();
        for i in 0..MEMORY_CAPACITY + 5 {
            m.record(event(MemoryKind::Commotion, i as f64, 1.0));
        }
        assert_eq!(m.len(), MEMORY_CAPACITY);
        assert_eq!(m.events().next().unwrap().time, 5.0);
    }

    #[test]
    fn test_levels_decay_independently() {
        let mut m = Memory::new();
        m.record(event(MemoryKind::Elimination, 0.0, 5.0));
        let (d0, i0) = (m.danger(), m.interest());
        m.decay(10.0);
        assert!((m.danger() - d0 * (-0.5f64).exp()).abs() < 1e-12);
        assert!((m.interest() - i0 * (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_levels_saturate_at_one() {
        let mut m = Memory::new();
        for _ in 0..10 {
            m.record(event(MemoryKind::Elimination, 0.0, 1.0));
        }
        assert_eq!(m.danger(), 1.0);
    }

    #[test]
    fn test_hostile_count_ignores_distant_and_benign() {
        let mut m = Memory::new();
        m.record(event(MemoryKind::WeaponDischarge, 0.0, 10.0));
        m.record(event(MemoryKind::WeaponDischarge, 0.0, HOSTILE_PROXIMITY_RADIUS + 1.0));
        m.record(event(MemoryKind::Commotion, 0.0, 1.0));
        assert_eq!(m.hostile_event_count(), 1);
    }
}
