//! Maps combat events onto nearby brains' memories.

use std::collections::HashMap;

use sentinel_core::constants::{DEFAULT_HEARING_RADIUS, REACTOR_DEBOUNCE_SECS};
use sentinel_core::types::Position;

use super::memory::{MemoryEvent, MemoryKind};

/// A world event as brains perceive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    pub kind: MemoryKind,
    pub position: Position,
    /// Entity that caused it; repeats from the same source are debounced.
    pub source_id: Option<String>,
    pub time: f64,
}

#[derive(Debug, Clone)]
pub struct EventReactor {
    pub hearing_radius: f64,
    pub debounce_secs: f64,
    last_heard: HashMap<(String, MemoryKind), f64>,
}

impl Default for EventReactor {
    fn default() -> Self {
        Self::new(DEFAULT_HEARING_RADIUS)
    }
}

impl EventReactor {
    pub fn new(hearing_radius: f64) -> Self {
        Self {
            hearing_radius,
            debounce_secs: REACTOR_DEBOUNCE_SECS,
            last_heard: HashMap::new(),
        }
    }

    /// False if the same source produced the same kind within the window.
    pub fn admit(&mut self, stimulus: &Stimulus) -> bool {
        let Some(source) = &stimulus.source_id else {
            return true;
        };
        let key = (source.clone(), stimulus.kind);
        if let Some(&last) = self.last_heard.get(&key) {
            if stimulus.time - last < self.debounce_secs {
                return false;
            }
        }
        self.last_heard.insert(key, stimulus.time);
        true
    }

    /// Memory entry for a listener at `listener`, or `None` out of earshot.
    /// Intensity falls off linearly with distance.
    pub fn perceive(&self, stimulus: &Stimulus, listener: Position) -> Option<MemoryEvent> {
        let distance = listener.distance_to(&stimulus.position);
        if !distance.is_finite() || distance > self.hearing_radius {
            return None;
        }
        let intensity = if self.hearing_radius > 0.0 {
            1.0 - distance / self.hearing_radius
        } else {
            1.0
        };
        Some(MemoryEvent {
            kind: stimulus.kind,
            time: stimulus.time,
            position: stimulus.position,
            distance,
            intensity,
        })
    }

    pub fn clear(&mut self) {
        self.last_heard.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(source: &str, time: f64) -> Stimulus {
        Stimulus {
            kind: MemoryKind::WeaponDischarge,
            position: Position::ORIGIN,
            source_id: Some(source.to_string()),
            time,
        }
    }

    #[test]
    fn test_repeats_within_window_are_dropped() {
        let mut r = EventReactor::default();
        assert!(r.admit(&shot("t1", 0.0)));
        assert!(!r.admit(&shot("t1", 0.5)));
        assert!(r.admit(&shot("t2", 0.5)));
        assert!(r.admit(&shot("t1", 1.0)));
    }

    #[test]
    fn test_intensity_falls_with_distance() {
        let r = EventReactor::new(60.0);
        let near = r.perceive(&shot("t", 0.0), Position::new(6.0, 0.0)).unwrap();
        let far = r.perceive(&shot("t", 0.0), Position::new(30.0, 0.0)).unwrap();
        assert!((near.intensity - 0.9).abs() < 1e-12);
        assert!((far.intensity - 0.5).abs() < 1e-12);
        assert!(r.perceive(&shot("t", 0.0), Position::new(61.0, 0.0)).is_none());
    }
}
