//! Undirected road network built from externally supplied segment geometry.
//!
//! Points are rounded to `STREET_NODE_PRECISION` so segments sharing an
//! intersection share a node. Edge weight is Euclidean length; duplicate
//! edges keep the shorter weight.

use std::collections::HashMap;

use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use sentinel_core::constants::STREET_NODE_PRECISION;
use sentinel_core::types::Position;

use crate::geometry::Zone;

type NodeKey = (i64, i64);

fn node_key(p: Position) -> NodeKey {
    (
        (p.x / STREET_NODE_PRECISION).round() as i64,
        (p.y / STREET_NODE_PRECISION).round() as i64,
    )
}

fn key_position(key: NodeKey) -> Position {
    Position::new(
        key.0 as f64 * STREET_NODE_PRECISION,
        key.1 as f64 * STREET_NODE_PRECISION,
    )
}

#[derive(Debug, Clone, Default)]
pub struct StreetGraph {
    graph: UnGraph<Position, f64>,
    index: HashMap<NodeKey, NodeIndex>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from polylines; each consecutive pair of points is one segment.
    pub fn from_polylines(polylines: &[Vec<Position>]) -> Self {
        let mut graph = Self::new();
        for line in polylines {
            for pair in line.windows(2) {
                graph.add_segment(pair[0], pair[1]);
            }
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "street graph built"
        );
        graph
    }

    fn node_for(&mut self, p: Position) -> NodeIndex {
        let key = node_key(p);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(key_position(key));
        self.index.insert(key, idx);
        idx
    }

    /// Add one road segment. Segments collapsing to a single node are ignored.
    pub fn add_segment(&mut self, a: Position, b: Position) {
        if !a.is_finite() || !b.is_finite() || node_key(a) == node_key(b) {
            return;
        }
        let na = self.node_for(a);
        let nb = self.node_for(b);
        let weight = self.graph[na].distance_to(&self.graph[nb]);
        match self.graph.find_edge(na, nb) {
            Some(edge) => {
                if weight < self.graph[edge] {
                    self.graph[edge] = weight;
                }
            }
            None => {
                self.graph.add_edge(na, nb, weight);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_position(&self, idx: NodeIndex) -> Option<Position> {
        self.graph.node_weight(idx).copied()
    }

    pub fn edge_weight(&self, a: NodeIndex, b: NodeIndex) -> Option<f64> {
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }

    /// Closest node and its distance, or `None` for an empty graph.
    pub fn nearest_node(&self, p: Position) -> Option<(NodeIndex, f64)> {
        self.nearest_node_where(p, |_| true)
    }

    fn nearest_node_where(
        &self,
        p: Position,
        accept: impl Fn(Position) -> bool,
    ) -> Option<(NodeIndex, f64)> {
        self.graph
            .node_indices()
            .filter(|&idx| accept(self.graph[idx]))
            .map(|idx| (idx, self.graph[idx].distance_to(&p)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
    }

    /// A* between the nodes nearest `start` and `end`.
    pub fn shortest_path(&self, start: Position, end: Position) -> Option<Vec<Position>> {
        self.shortest_path_avoiding(start, end, &[])
    }

    /// A* that never enters a node lying inside any of `zones`.
    pub fn shortest_path_avoiding(
        &self,
        start: Position,
        end: Position,
        zones: &[Zone],
    ) -> Option<Vec<Position>> {
        let open = |p: Position| !zones.iter().any(|z| z.contains(p));
        let (from, _) = self.nearest_node_where(start, open)?;
        let (goal, _) = self.nearest_node_where(end, open)?;
        let goal_pos = self.graph[goal];

        let (cost, nodes) = astar(
            &self.graph,
            from,
            |n| n == goal,
            |e| {
                if open(self.graph[e.target()]) {
                    *e.weight()
                } else {
                    f64::INFINITY
                }
            },
            |n| self.graph[n].distance_to(&goal_pos),
        )?;

        if !cost.is_finite() {
            return None;
        }
        Some(nodes.into_iter().map(|n| self.graph[n]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 3x3 grid of streets spaced 10 units apart.
    fn grid() -> StreetGraph {
        let mut lines = Vec::new();
        for i in 0..3 {
            let c = i as f64 * 10.0;
            lines.push(vec![Position::new(0.0, c), Position::new(10.0, c), Position::new(20.0, c)]);
            lines.push(vec![Position::new(c, 0.0), Position::new(c, 10.0), Position::new(c, 20.0)]);
        }
        StreetGraph::from_polylines(&lines)
    }

    fn path_length(path: &[Position]) -> f64 {
        path.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    #[test]
    fn test_shared_intersections_merge() {
        let g = grid();
        assert_eq!(g.node_count(), 9);
        assert_eq!(g.edge_count(), 12);
    }

    #[test]
    fn test_rounding_merges_nearby_points() {
        let mut g = StreetGraph::new();
        g.add_segment(Position::new(0.0, 0.0), Position::new(10.0, 0.0));
        g.add_segment(Position::new(10.02, 0.01), Position::new(10.0, 10.0));
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn test_duplicate_edge_keeps_shorter_weight() {
        let mut g = StreetGraph::new();
        g.add_segment(Position::new(0.0, 0.0), Position::new(10.0, 0.0));
        g.add_segment(Position::new(10.0, 0.0), Position::new(0.0, 0.0));
        assert_eq!(g.edge_count(), 1);
        let (a, _) = g.nearest_node(Position::new(0.0, 0.0)).unwrap();
        let (b, _) = g.nearest_node(Position::new(10.0, 0.0)).unwrap();
        assert!((g.edge_weight(a, b).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_segment_ignored() {
        let mut g = StreetGraph::new();
        g.add_segment(Position::new(1.0, 1.0), Position::new(1.0, 1.0));
        assert!(g.is_empty());
    }

    #[test]
    fn test_nearest_node_empty_graph() {
        let g = StreetGraph::new();
        assert!(g.nearest_node(Position::ORIGIN).is_none());
        assert!(g.shortest_path(Position::ORIGIN, Position::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_nearest_node_distance() {
        let g = grid();
        let (idx, d) = g.nearest_node(Position::new(11.0, 9.0)).unwrap();
        assert_eq!(g.node_position(idx), Some(Position::new(10.0, 10.0)));
        assert!((d - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_shortest_path_endpoints_and_length() {
        let g = grid();
        let start = Position::new(0.3, 0.2);
        let end = Position::new(19.8, 20.1);
        let path = g.shortest_path(start, end).unwrap();
        let snap = STREET_NODE_PRECISION * 10.0;
        assert!(path.first().unwrap().distance_to(&start) <= snap);
        assert!(path.last().unwrap().distance_to(&end) <= snap);
        // Manhattan distance on the grid: every hop is one 10-unit edge.
        assert_eq!(path.len(), 5);
        let edge_sum: f64 = path
            .windows(2)
            .map(|w| {
                let (a, _) = g.nearest_node(w[0]).unwrap();
                let (b, _) = g.nearest_node(w[1]).unwrap();
                g.edge_weight(a, b).expect("consecutive path nodes share an edge")
            })
            .sum();
        assert!((path_length(&path) - edge_sum).abs() < 1e-9);
        assert!((edge_sum - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_node_returns_single_point() {
        let g = grid();
        let path = g.shortest_path(Position::new(10.1, 10.0), Position::new(9.9, 10.2)).unwrap();
        assert_eq!(path, vec![Position::new(10.0, 10.0)]);
    }

    #[test]
    fn test_disconnected_graph_has_no_path() {
        let mut g = StreetGraph::new();
        g.add_segment(Position::new(0.0, 0.0), Position::new(5.0, 0.0));
        g.add_segment(Position::new(50.0, 0.0), Position::new(55.0, 0.0));
        assert!(g.shortest_path(Position::ORIGIN, Position::new(55.0, 0.0)).is_none());
    }

    #[test]
    fn test_path_avoids_blocked_node() {
        let g = grid();
        // Block the centre intersection.
        let zones = [Zone::new(Position::new(10.0, 10.0), 1.0)];
        let path = g
            .shortest_path_avoiding(Position::new(10.0, 0.0), Position::new(10.0, 20.0), &zones)
            .unwrap();
        assert!(path.iter().all(|p| p.distance_to(&Position::new(10.0, 10.0)) > 1.0));
        assert!((path_length(&path) - 40.0).abs() < 1e-9);
    }
}
