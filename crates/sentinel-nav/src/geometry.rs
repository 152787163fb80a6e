//! Planar geometry helpers.
//!
//! Degenerate input (polygons with fewer than three points, zero-length
//! segments) always yields the conservative answer: not contained, not blocked.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use sentinel_core::types::Position;

/// Circular area (hazard footprint) that paths must avoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub center: Position,
    pub radius: f64,
}

impl Zone {
    pub fn new(center: Position, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Position) -> bool {
        self.center.distance_to(&p) <= self.radius
    }

    pub fn intersects_segment(&self, a: Position, b: Position) -> bool {
        distance_point_segment(self.center, a, b) <= self.radius
    }
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(p: Position, polygon: &[Position]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closest point to `p` on segment `a`-`b`.
pub fn closest_point_on_segment(p: Position, a: Position, b: Position) -> Position {
    let (pv, av, bv) = (p.to_vec(), a.to_vec(), b.to_vec());
    let ab = bv - av;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return a;
    }
    let t = ((pv - av).dot(ab) / len_sq).clamp(0.0, 1.0);
    (av + ab * t).into()
}

pub fn distance_point_segment(p: Position, a: Position, b: Position) -> f64 {
    p.distance_to(&closest_point_on_segment(p, a, b))
}

fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Proper or touching intersection of segments `a`-`b` and `c`-`d`.
pub fn segments_intersect(a: Position, b: Position, c: Position, d: Position) -> bool {
    let (a, b, c, d) = (a.to_vec(), b.to_vec(), c.to_vec(), d.to_vec());
    let r = b - a;
    let s = d - c;
    let denom = cross(r, s);
    if denom.abs() <= f64::EPSILON {
        // Parallel or degenerate: treat as non-blocking.
        return false;
    }
    let t = cross(c - a, s) / denom;
    let u = cross(c - a, r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Static building footprints that block movement and ground line of sight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Obstacles {
    polygons: Vec<Vec<Position>>,
}

impl Obstacles {
    pub fn new(polygons: Vec<Vec<Position>>) -> Self {
        Self { polygons }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygons(&self) -> &[Vec<Position>] {
        &self.polygons
    }

    pub fn contains(&self, p: Position) -> bool {
        self.polygons.iter().any(|poly| point_in_polygon(p, poly))
    }

    /// True if any valid polygon edge crosses the sight line `from`-`to`.
    pub fn blocks_line_of_sight(&self, from: Position, to: Position) -> bool {
        if from.distance_to(&to) <= f64::EPSILON {
            return false;
        }
        self.polygons
            .iter()
            .filter(|poly| poly.len() >= 3)
            .any(|poly| {
                (0..poly.len()).any(|i| {
                    let a = poly[i];
                    let b = poly[(i + 1) % poly.len()];
                    segments_intersect(from, to, a, b)
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Position> {
        vec![
            Position::new(cx - half, cy - half),
            Position::new(cx + half, cy - half),
            Position::new(cx + half, cy + half),
            Position::new(cx - half, cy + half),
        ]
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square(0.0, 0.0, 2.0);
        assert!(point_in_polygon(Position::new(0.5, 0.5), &sq));
        assert!(!point_in_polygon(Position::new(3.0, 0.0), &sq));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = vec![Position::new(0.0, 0.0), Position::new(5.0, 5.0)];
        assert!(!point_in_polygon(Position::new(2.5, 2.5), &line));
        let obstacles = Obstacles::new(vec![line]);
        assert!(!obstacles.contains(Position::new(2.5, 2.5)));
        assert!(!obstacles.blocks_line_of_sight(Position::new(0.0, 5.0), Position::new(5.0, 0.0)));
    }

    #[test]
    fn test_zero_length_segment_distance() {
        let a = Position::new(1.0, 1.0);
        let d = distance_point_segment(Position::new(4.0, 5.0), a, a);
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_of_sight_blocked_by_building() {
        let obstacles = Obstacles::new(vec![square(0.0, 0.0, 2.0)]);
        assert!(obstacles.blocks_line_of_sight(Position::new(-10.0, 0.0), Position::new(10.0, 0.0)));
        assert!(!obstacles.blocks_line_of_sight(Position::new(-10.0, 5.0), Position::new(10.0, 5.0)));
    }

    #[test]
    fn test_zone_segment_intersection() {
        let zone = Zone::new(Position::new(0.0, 0.0), 3.0);
        assert!(zone.intersects_segment(Position::new(-10.0, 1.0), Position::new(10.0, 1.0)));
        assert!(!zone.intersects_segment(Position::new(-10.0, 4.0), Position::new(10.0, 4.0)));
    }
}
