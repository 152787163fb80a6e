//! Converts a destination into a waypoint sequence.
//!
//! Street-aware when a graph is loaded and the asset is a ground type;
//! hazard-aware always. Failure never propagates: anything the street
//! search cannot resolve falls back to a direct line.

use glam::DVec2;

use sentinel_core::constants::{HAZARD_DETOUR_MARGIN, PATH_SMOOTHING_TOLERANCE};
use sentinel_core::enums::AssetType;
use sentinel_core::types::Position;

use crate::geometry::{closest_point_on_segment, Zone};
use crate::motion::smooth_path;
use crate::street_graph::StreetGraph;

pub struct Pathfinder<'a> {
    streets: Option<&'a StreetGraph>,
    zones: &'a [Zone],
}

impl<'a> Pathfinder<'a> {
    pub fn new(streets: Option<&'a StreetGraph>, zones: &'a [Zone]) -> Self {
        Self { streets, zones }
    }

    /// Waypoints from `start` (exclusive) to a hazard-free point at or near `end`.
    pub fn plan(&self, start: Position, end: Position, asset_type: AssetType) -> Vec<Position> {
        let destination = self.clear_of_zones(end, start);

        let streets = match self.streets {
            Some(g) if !g.is_empty() && !asset_type.is_aerial() => g,
            _ => return self.direct_route(start, destination),
        };

        match streets.shortest_path_avoiding(start, destination, self.zones) {
            Some(mut nodes) => {
                if nodes
                    .last()
                    .is_some_and(|last| last.distance_to(&destination) > f64::EPSILON)
                {
                    nodes.push(destination);
                }
                let mut route = smooth_path(&nodes, PATH_SMOOTHING_TOLERANCE);
                if route
                    .first()
                    .is_some_and(|first| first.distance_to(&start) <= f64::EPSILON)
                {
                    route.remove(0);
                }
                if route.is_empty() {
                    route.push(destination);
                }
                route
            }
            None => {
                tracing::debug!(?start, ?destination, "no street route, using direct line");
                self.direct_route(start, destination)
            }
        }
    }

    /// Move a point that sits inside a zone to just outside that zone's edge.
    fn clear_of_zones(&self, p: Position, fallback_from: Position) -> Position {
        let mut point = p;
        for _ in 0..self.zones.len() {
            let Some(zone) = self.zones.iter().find(|z| z.contains(point)) else {
                break;
            };
            let center = zone.center.to_vec();
            let mut dir = point.to_vec() - center;
            if dir.length_squared() <= f64::EPSILON {
                dir = fallback_from.to_vec() - center;
            }
            let dir = dir.try_normalize().unwrap_or(DVec2::Y);
            point = (center + dir * (zone.radius + HAZARD_DETOUR_MARGIN)).into();
        }
        point
    }

    /// Straight line with one detour point around each zone the line crosses.
    fn direct_route(&self, start: Position, end: Position) -> Vec<Position> {
        let mut crossings: Vec<(f64, Position)> = self
            .zones
            .iter()
            .filter(|z| !z.contains(start) && z.intersects_segment(start, end))
            .map(|z| {
                let q = closest_point_on_segment(z.center, start, end);
                let center = z.center.to_vec();
                let seg = end.to_vec() - start.to_vec();
                let away = (q.to_vec() - center)
                    .try_normalize()
                    .or_else(|| seg.perp().try_normalize())
                    .unwrap_or(DVec2::X);
                let detour: Position = (center + away * (z.radius + HAZARD_DETOUR_MARGIN)).into();
                (start.distance_to(&q), detour)
            })
            .filter(|(_, detour)| !self.zones.iter().any(|z| z.contains(*detour)))
            .collect();
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut route: Vec<Position> = crossings.into_iter().map(|(_, p)| p).collect();
        route.push(end);
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> StreetGraph {
        let mut lines = Vec::new();
        for i in 0..3 {
            let c = i as f64 * 10.0;
            lines.push(vec![Position::new(0.0, c), Position::new(10.0, c), Position::new(20.0, c)]);
            lines.push(vec![Position::new(c, 0.0), Position::new(c, 10.0), Position::new(c, 20.0)]);
        }
        StreetGraph::from_polylines(&lines)
    }

    #[test]
    fn test_no_graph_is_direct_line() {
        let pf = Pathfinder::new(None, &[]);
        let route = pf.plan(Position::ORIGIN, Position::new(5.0, 5.0), AssetType::Rover);
        assert_eq!(route, vec![Position::new(5.0, 5.0)]);
    }

    #[test]
    fn test_aerial_ignores_streets() {
        let g = grid();
        let pf = Pathfinder::new(Some(&g), &[]);
        let route = pf.plan(Position::ORIGIN, Position::new(20.0, 20.0), AssetType::Drone);
        assert_eq!(route, vec![Position::new(20.0, 20.0)]);
    }

    #[test]
    fn test_ground_follows_streets() {
        let g = grid();
        let pf = Pathfinder::new(Some(&g), &[]);
        let route = pf.plan(Position::ORIGIN, Position::new(20.0, 20.0), AssetType::Rover);
        assert_eq!(route.last(), Some(&Position::new(20.0, 20.0)));
        // Every leg runs along a street, never diagonally across a block.
        let mut prev = Position::ORIGIN;
        let mut length = 0.0;
        for p in &route {
            assert!(p.x == prev.x || p.y == prev.y, "diagonal leg {prev:?} -> {p:?}");
            length += prev.distance_to(p);
            prev = *p;
        }
        assert!((length - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_direct_line_detours_around_hazard() {
        let zones = [Zone::new(Position::new(10.0, 0.0), 3.0)];
        let pf = Pathfinder::new(None, &zones);
        let route = pf.plan(Position::ORIGIN, Position::new(20.0, 0.0), AssetType::Drone);
        assert_eq!(route.len(), 2);
        assert!(!zones[0].contains(route[0]));
        let mut prev = Position::ORIGIN;
        for p in &route {
            assert!(!zones[0].intersects_segment(prev, *p));
            prev = *p;
        }
    }

    #[test]
    fn test_destination_inside_hazard_is_moved_out() {
        let zones = [Zone::new(Position::new(10.0, 10.0), 4.0)];
        let pf = Pathfinder::new(None, &zones);
        let route = pf.plan(Position::ORIGIN, Position::new(11.0, 10.0), AssetType::Rover);
        let last = *route.last().unwrap();
        assert!(!zones[0].contains(last));
    }

    #[test]
    fn test_unreachable_street_falls_back_to_direct() {
        let mut g = StreetGraph::new();
        g.add_segment(Position::new(0.0, 0.0), Position::new(5.0, 0.0));
        g.add_segment(Position::new(50.0, 0.0), Position::new(55.0, 0.0));
        let pf = Pathfinder::new(Some(&g), &[]);
        let route = pf.plan(Position::ORIGIN, Position::new(55.0, 0.0), AssetType::Rover);
        assert_eq!(route, vec![Position::new(55.0, 0.0)]);
    }
}
