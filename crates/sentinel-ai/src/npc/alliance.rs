//! Radicalization: neutral agents turning hostile.

use sentinel_core::constants::{RADICALIZATION_AGGRESSION_CUTOFF, RADICALIZATION_EVENT_THRESHOLD};
use sentinel_core::enums::{Alliance, ThreatLevel};
use sentinel_core::target::Target;

use super::brain::Brain;

#[derive(Debug, Clone, Copy)]
pub struct AllianceManager {
    pub event_threshold: usize,
    pub aggression_cutoff: f64,
}

impl Default for AllianceManager {
    fn default() -> Self {
        Self {
            event_threshold: RADICALIZATION_EVENT_THRESHOLD,
            aggression_cutoff: RADICALIZATION_AGGRESSION_CUTOFF,
        }
    }
}

impl AllianceManager {
    /// All three conditions: enough hostile-proximate memories, escalation
    /// at its highest tier, aggression above the cutoff.
    pub fn should_radicalize(&self, brain: &Brain, level: ThreatLevel) -> bool {
        !brain.is_radicalized()
            && level.is_highest()
            && brain.personality.aggression > self.aggression_cutoff
            && brain.memory.hostile_event_count() >= self.event_threshold
    }

    /// Flip `target` to a hostile combatant when the brain qualifies.
    /// Returns true when the flip happened; otherwise nothing is touched.
    pub fn check(&self, brain: &mut Brain, target: &mut Target, level: ThreatLevel, now: f64) -> bool {
        if target.alliance() != Alliance::Neutral || !self.should_radicalize(brain, level) {
            return false;
        }
        if let Err(err) = target.radicalize() {
            tracing::warn!(target_id = %target.id, %err, "radicalization rejected");
            return false;
        }
        brain.mark_radicalized(now);
        tracing::info!(target_id = %target.id, "neutral radicalized");
        true
    }
}
