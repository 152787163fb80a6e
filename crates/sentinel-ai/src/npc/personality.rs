use rand::Rng;
use serde::{Deserialize, Serialize};

/// Four traits in [0, 1] shaping fallback decisions and radicalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub curiosity: f64,
    pub caution: f64,
    pub sociability: f64,
    pub aggression: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5, 0.5)
    }
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

impl Personality {
    pub fn new(curiosity: f64, caution: f64, sociability: f64, aggression: f64) -> Self {
        Self {
            curiosity: unit(curiosity),
            caution: unit(caution),
            sociability: unit(sociability),
            aggression: unit(aggression),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.gen(), rng.gen(), rng.gen(), rng.gen())
    }

    pub fn with_aggression(self, aggression: f64) -> Self {
        Self {
            aggression: unit(aggression),
            ..self
        }
    }
}
