//! Panic and curiosity contagion between nearby brains.

use sentinel_core::constants::{CONTAGION_RATE, DEFAULT_CROWD_RADIUS};
use sentinel_core::types::Position;

/// Levels of one agent at the start of a contagion step.
#[derive(Debug, Clone, Copy)]
pub struct CrowdAgent {
    pub position: Position,
    pub danger: f64,
    pub interest: f64,
    pub sociability: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CrowdDynamics {
    pub radius: f64,
    /// Fraction of the largest neighbour excess absorbed per second.
    pub rate: f64,
}

impl Default for CrowdDynamics {
    fn default() -> Self {
        Self {
            radius: DEFAULT_CROWD_RADIUS,
            rate: CONTAGION_RATE,
        }
    }
}

impl CrowdDynamics {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Per-agent (danger, interest) increments for one step of `dt`.
    /// Levels only flow from higher to lower, and never past the source.
    pub fn deltas(&self, dt: f64, agents: &[CrowdAgent]) -> Vec<(f64, f64)> {
        let r2 = self.radius * self.radius;
        agents
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let mut danger_gap: f64 = 0.0;
                let mut interest_gap: f64 = 0.0;
                for (j, b) in agents.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let dx = a.position.x - b.position.x;
                    let dy = a.position.y - b.position.y;
                    if dx * dx + dy * dy > r2 {
                        continue;
                    }
                    danger_gap = danger_gap.max(b.danger - a.danger);
                    interest_gap = interest_gap.max(b.interest - a.interest);
                }
                let gain = (self.rate * dt * (0.5 + a.sociability)).clamp(0.0, 1.0);
                (danger_gap * gain, interest_gap * gain)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(x: f64, danger: f64) -> CrowdAgent {
        CrowdAgent {
            position: Position::new(x, 0.0),
            danger,
            interest: 0.0,
            sociability: 0.5,
        }
    }

    #[test]
    fn test_panic_spreads_to_neighbours_only() {
        let crowd = CrowdDynamics::default();
        let agents = [agent(0.0, 1.0), agent(3.0, 0.0), agent(50.0, 0.0)];
        let d = crowd.deltas(1.0, &agents);
        assert_eq!(d[0].0, 0.0);
        assert!((d[1].0 - CONTAGION_RATE).abs() < 1e-12);
        assert_eq!(d[2].0, 0.0);
    }

    #[test]
    fn test_contagion_never_overshoots() {
        let crowd = CrowdDynamics::default();
        let agents = [agent(0.0, 0.8), agent(1.0, 0.2)];
        let d = crowd.deltas(100.0, &agents);
        assert!(0.2 + d[1].0 <= 0.8 + 1e-12);
    }
}
