//! Per-entity smoothed movement toward waypoints.
//!
//! Heading turns at a bounded rate, and the speed cap shrinks with how
//! sharp the remaining turn is: straight ahead allows full speed, a
//! near-reversal forces the unit almost to a stop while it turns.

use serde::{Deserialize, Serialize};

use sentinel_core::constants::ARRIVAL_TOLERANCE;
use sentinel_core::profiles::AssetProfile;
use sentinel_core::types::{angle_delta, wrap_degrees, Position};

use crate::geometry::distance_point_segment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionController {
    pub position: Position,
    /// Compass heading in degrees, [0, 360).
    pub heading: f64,
    pub speed: f64,
    pub max_speed: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    /// Degrees per second.
    pub turn_rate: f64,
    pub arrival_tolerance: f64,
    waypoints: Vec<Position>,
    current: usize,
    loop_path: bool,
    arrived: bool,
}

impl MotionController {
    pub fn new(position: Position, max_speed: f64) -> Self {
        Self {
            position,
            heading: 0.0,
            speed: 0.0,
            max_speed,
            acceleration: sentinel_core::constants::DEFAULT_ACCELERATION,
            deceleration: sentinel_core::constants::DEFAULT_DECELERATION,
            turn_rate: sentinel_core::constants::DEFAULT_TURN_RATE,
            arrival_tolerance: ARRIVAL_TOLERANCE,
            waypoints: Vec::new(),
            current: 0,
            loop_path: false,
            arrived: false,
        }
    }

    pub fn from_profile(position: Position, profile: &AssetProfile) -> Self {
        Self {
            acceleration: profile.acceleration,
            deceleration: profile.deceleration,
            turn_rate: profile.turn_rate,
            ..Self::new(position, profile.base_speed)
        }
    }

    /// Replace the waypoint queue and clear "arrived".
    pub fn set_path(&mut self, waypoints: Vec<Position>, loop_path: bool) {
        self.waypoints = waypoints;
        self.current = 0;
        self.loop_path = loop_path;
        self.arrived = false;
    }

    pub fn set_destination(&mut self, destination: Position) {
        self.set_path(vec![destination], false);
    }

    /// Drop all waypoints and halt in place.
    pub fn stop(&mut self) {
        self.waypoints.clear();
        self.current = 0;
        self.loop_path = false;
        self.speed = 0.0;
    }

    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Waypoints not yet reached, starting with the current one.
    pub fn remaining_waypoints(&self) -> &[Position] {
        if self.arrived {
            &[]
        } else {
            self.waypoints.get(self.current..).unwrap_or(&[])
        }
    }

    pub fn current_waypoint(&self) -> Option<Position> {
        if self.arrived {
            None
        } else {
            self.waypoints.get(self.current).copied()
        }
    }

    pub fn is_arrived(&self) -> bool {
        self.arrived
    }

    pub fn is_looping(&self) -> bool {
        self.loop_path
    }

    /// Advance to the next waypoint. Returns false when the path is finished.
    fn advance(&mut self) -> bool {
        if self.current + 1 < self.waypoints.len() {
            self.current += 1;
            true
        } else if self.loop_path {
            self.current = 0;
            true
        } else {
            self.arrived = true;
            self.speed = 0.0;
            false
        }
    }

    pub fn tick(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        if self.waypoints.is_empty() || self.arrived {
            return;
        }

        // Skip waypoints we are already sitting on. Bounded so a looping
        // path whose points all lie within tolerance cannot spin forever.
        let mut skipped = 0;
        while self.position.distance_to(&self.waypoints[self.current]) <= self.arrival_tolerance {
            if !self.advance() || skipped >= self.waypoints.len() {
                return;
            }
            skipped += 1;
        }

        let target = self.waypoints[self.current];
        let dist = self.position.distance_to(&target);

        let desired = self.position.bearing_to(&target);
        let diff = angle_delta(self.heading, desired);
        let max_turn = self.turn_rate * dt;
        let turn = diff.clamp(-max_turn, max_turn);
        self.heading = wrap_degrees(self.heading + turn);

        let sharpness = ((diff - turn).abs() / 180.0).clamp(0.0, 1.0);
        let mut cap = self.max_speed.max(0.0) * (1.0 - sharpness);
        let final_leg = !self.loop_path && self.current + 1 == self.waypoints.len();
        if final_leg {
            cap = cap.min((2.0 * self.deceleration * dist).sqrt());
        }

        if self.speed < cap {
            self.speed = (self.speed + self.acceleration * dt).min(cap);
        } else {
            self.speed = (self.speed - self.deceleration * dt).max(cap);
        }

        let step = self.speed * dt;
        if step >= dist {
            self.position = target;
            self.advance();
        } else {
            self.position = self.position.offset_by_heading(self.heading, step);
            if self.position.distance_to(&target) <= self.arrival_tolerance {
                self.advance();
            }
        }
    }
}

/// Remove near-collinear intermediate points. The first and last points
/// and any corner deviating more than `tolerance` are always kept.
pub fn smooth_path(points: &[Position], tolerance: f64) -> Vec<Position> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = vec![points[0]];
    for i in 1..points.len() - 1 {
        let prev = out[out.len() - 1];
        let next = points[i + 1];
        if distance_point_segment(points[i], prev, next) > tolerance {
            out.push(points[i]);
        }
    }
    out.push(points[points.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ctrl: &mut MotionController, secs: f64, dt: f64) {
        let steps = (secs / dt).round() as usize;
        for _ in 0..steps {
            ctrl.tick(dt);
        }
    }

    #[test]
    fn test_no_waypoints_is_noop() {
        let mut ctrl = MotionController::new(Position::new(1.0, 2.0), 3.0);
        ctrl.tick(0.1);
        assert_eq!(ctrl.position, Position::new(1.0, 2.0));
        assert_eq!(ctrl.speed, 0.0);
    }

    #[test]
    fn test_no_waypoints_leaves_speed_alone() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.speed = 2.0;
        ctrl.heading = 45.0;
        ctrl.tick(0.1);
        assert_eq!(ctrl.speed, 2.0);
        assert_eq!(ctrl.heading, 45.0);
        assert_eq!(ctrl.position, Position::ORIGIN);
    }

    #[test]
    fn test_stop_halts_immediately() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.set_destination(Position::new(0.0, 50.0));
        run(&mut ctrl, 3.0, 0.1);
        assert!(ctrl.speed > 0.0);
        ctrl.stop();
        assert_eq!(ctrl.speed, 0.0);
        let held = ctrl.position;
        ctrl.tick(0.1);
        assert_eq!(ctrl.position, held);
    }

    #[test]
    fn test_single_waypoint_arrives() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        let dest = Position::new(10.0, 10.0);
        ctrl.set_destination(dest);
        run(&mut ctrl, 30.0, 0.1);
        assert!(ctrl.is_arrived());
        assert!(ctrl.position.distance_to(&dest) <= ctrl.arrival_tolerance + 1e-9);
        assert_eq!(ctrl.speed, 0.0);
    }

    #[test]
    fn test_looping_patrol_never_arrives() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 4.0);
        ctrl.set_path(
            vec![
                Position::new(10.0, 0.0),
                Position::new(10.0, 10.0),
                Position::new(0.0, 10.0),
                Position::new(0.0, 0.0),
            ],
            true,
        );
        for _ in 0..3000 {
            ctrl.tick(0.1);
            assert!(!ctrl.is_arrived());
        }
    }

    #[test]
    fn test_turn_rate_bounds_heading_change() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.turn_rate = 90.0;
        ctrl.heading = 0.0;
        ctrl.set_destination(Position::new(10.0, 0.0)); // due East
        ctrl.tick(0.1);
        assert!((ctrl.heading - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_wraps_into_range() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.heading = 5.0;
        ctrl.turn_rate = 90.0;
        ctrl.set_destination(Position::new(-10.0, 0.5)); // roughly West
        ctrl.tick(0.1);
        assert!(ctrl.heading >= 0.0 && ctrl.heading < 360.0);
        assert!((ctrl.heading - 356.0).abs() < 1e-9);
    }

    #[test]
    fn test_reversal_keeps_speed_near_zero() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.turn_rate = 30.0;
        ctrl.heading = 0.0;
        ctrl.speed = 3.0;
        ctrl.set_destination(Position::new(0.0, -20.0)); // directly behind
        ctrl.tick(0.1);
        // Still facing away: speed must be dropping hard.
        assert!(ctrl.speed < 3.0);
        for _ in 0..8 {
            ctrl.tick(0.1);
        }
        assert!(ctrl.speed < 0.6, "speed {} should be near zero", ctrl.speed);
    }

    #[test]
    fn test_straight_line_accelerates_to_max() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.set_destination(Position::new(0.0, 100.0));
        run(&mut ctrl, 3.0, 0.1);
        assert!((ctrl.speed - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_path_clears_arrived() {
        let mut ctrl = MotionController::new(Position::ORIGIN, 3.0);
        ctrl.set_destination(Position::new(0.0, 2.0));
        run(&mut ctrl, 10.0, 0.1);
        assert!(ctrl.is_arrived());
        ctrl.set_destination(Position::new(5.0, 5.0));
        assert!(!ctrl.is_arrived());
        assert_eq!(ctrl.current_waypoint(), Some(Position::new(5.0, 5.0)));
    }

    #[test]
    fn test_smooth_path_removes_collinear_points() {
        let pts = vec![
            Position::new(0.0, 0.0),
            Position::new(1.0, 0.0),
            Position::new(2.0, 0.05),
            Position::new(3.0, 0.0),
            Position::new(3.0, 5.0),
        ];
        let smoothed = smooth_path(&pts, 0.1);
        assert_eq!(
            smoothed,
            vec![Position::new(0.0, 0.0), Position::new(3.0, 0.0), Position::new(3.0, 5.0)]
        );
    }

    #[test]
    fn test_smooth_path_keeps_endpoints() {
        let pts = vec![Position::new(0.0, 0.0), Position::new(1.0, 1.0)];
        assert_eq!(smooth_path(&pts, 10.0), pts);
        let three = vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0), Position::new(2.0, 0.0)];
        assert_eq!(
            smooth_path(&three, 0.01),
            vec![Position::new(0.0, 0.0), Position::new(2.0, 0.0)]
        );
    }
}
