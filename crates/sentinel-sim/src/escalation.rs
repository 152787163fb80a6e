//! Ambient threat escalation tier.

use sentinel_core::constants::*;
use sentinel_core::enums::ThreatLevel;
use sentinel_core::events::SimEvent;
use sentinel_core::types::Position;

#[derive(Debug, Clone, Default)]
pub struct EscalationTracker {
    level: ThreatLevel,
    manual: Option<ThreatLevel>,
}

/// Tier implied by the active hostiles' count and proximity.
pub fn assess(hostiles: &[Position], defended_point: Position, map_radius: f64) -> ThreatLevel {
    if hostiles.is_empty() {
        return ThreatLevel::Green;
    }
    let closest = hostiles
        .iter()
        .map(|p| p.distance_to(&defended_point))
        .fold(f64::INFINITY, f64::min);
    if closest <= map_radius * ESCALATION_INNER_FRACTION {
        ThreatLevel::Red
    } else if closest <= map_radius * ESCALATION_MID_FRACTION
        || hostiles.len() >= ESCALATION_ORANGE_COUNT
    {
        ThreatLevel::Orange
    } else {
        ThreatLevel::Yellow
    }
}

impl EscalationTracker {
    pub fn level(&self) -> ThreatLevel {
        self.level
    }

    pub fn manual(&self) -> Option<ThreatLevel> {
        self.manual
    }

    /// Pin the level (`Some`) or go back to automatic assessment (`None`).
    pub fn set_manual(&mut self, level: Option<ThreatLevel>, events: &mut Vec<SimEvent>) {
        self.manual = level;
        if let Some(level) = level {
            self.apply(level, events);
        }
    }

    pub fn update(
        &mut self,
        hostiles: &[Position],
        defended_point: Position,
        map_radius: f64,
        events: &mut Vec<SimEvent>,
    ) {
        let next = self
            .manual
            .unwrap_or_else(|| assess(hostiles, defended_point, map_radius));
        self.apply(next, events);
    }

    fn apply(&mut self, to: ThreatLevel, events: &mut Vec<SimEvent>) {
        if to == self.level {
            return;
        }
        tracing::info!(from = ?self.level, to = ?to, "threat escalation");
        events.push(SimEvent::ThreatEscalation {
            from: self.level,
            to,
        });
        self.level = to;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_by_distance() {
        let o = Position::ORIGIN;
        assert_eq!(assess(&[], o, 100.0), ThreatLevel::Green);
        assert_eq!(assess(&[Position::new(0.0, 90.0)], o, 100.0), ThreatLevel::Yellow);
        assert_eq!(assess(&[Position::new(0.0, 40.0)], o, 100.0), ThreatLevel::Orange);
        assert_eq!(assess(&[Position::new(0.0, 20.0)], o, 100.0), ThreatLevel::Red);
        let crowd = vec![Position::new(0.0, 90.0); ESCALATION_ORANGE_COUNT];
        assert_eq!(assess(&crowd, o, 100.0), ThreatLevel::Orange);
    }

    #[test]
    fn test_emits_only_on_change() {
        let mut t = EscalationTracker::default();
        let mut events = Vec::new();
        let near = [Position::new(0.0, 5.0)];
        t.update(&near, Position::ORIGIN, 100.0, &mut events);
        t.update(&near, Position::ORIGIN, 100.0, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(t.level(), ThreatLevel::Red);
    }

    #[test]
    fn test_manual_override_holds() {
        let mut t = EscalationTracker::default();
        let mut events = Vec::new();
        t.set_manual(Some(ThreatLevel::Red), &mut events);
        t.update(&[], Position::ORIGIN, 100.0, &mut events);
        assert_eq!(t.level(), ThreatLevel::Red);
        t.set_manual(None, &mut events);
        t.update(&[], Position::ORIGIN, 100.0, &mut events);
        assert_eq!(t.level(), ThreatLevel::Green);
    }
}
