//! Static cover objects and the damage reduction they grant.

use serde::{Deserialize, Serialize};

use sentinel_core::constants::MAX_COVER_BONUS;
use sentinel_core::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverObject {
    pub center: Position,
    pub radius: f64,
    /// Maximum damage reduction, in [0, 1].
    pub value: f64,
}

impl CoverObject {
    pub fn new(center: Position, radius: f64, value: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            value: if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 },
        }
    }

    pub fn contains(&self, p: Position) -> bool {
        self.radius > 0.0 && self.center.distance_to(&p) <= self.radius
    }
}

/// Reduction one cover object grants `target` against fire from `attacker`.
///
/// Zero unless the object's centre is within its radius of the target and
/// on the attacker's side (attacker->target . cover->target > 0). Scaled by
/// how centred the target is, capped at `MAX_COVER_BONUS`.
pub fn cover_bonus(cover: &CoverObject, target: Position, attacker: Position) -> f64 {
    if !cover.contains(target) {
        return 0.0;
    }
    let attacker_to_target = target.to_vec() - attacker.to_vec();
    let cover_to_target = target.to_vec() - cover.center.to_vec();
    if attacker_to_target.dot(cover_to_target) <= 0.0 {
        return 0.0;
    }
    let centred = 1.0 - cover.center.distance_to(&target) / cover.radius;
    (cover.value * centred).clamp(0.0, MAX_COVER_BONUS)
}

#[derive(Debug, Clone, Default)]
pub struct CoverSystem {
    objects: Vec<CoverObject>,
}

impl CoverSystem {
    pub fn add(&mut self, object: CoverObject) {
        self.objects.push(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> &[CoverObject] {
        &self.objects
    }

    /// Best bonus any object grants against this attacker.
    pub fn bonus(&self, target: Position, attacker: Position) -> f64 {
        self.objects
            .iter()
            .map(|c| cover_bonus(c, target, attacker))
            .fold(0.0, f64::max)
    }

    pub fn in_cover(&self, p: Position) -> bool {
        self.objects.iter().any(|c| c.contains(p))
    }

    pub fn nearest(&self, p: Position) -> Option<&CoverObject> {
        self.objects
            .iter()
            .min_by(|a, b| a.center.distance_to(&p).total_cmp(&b.center.distance_to(&p)))
    }
}
