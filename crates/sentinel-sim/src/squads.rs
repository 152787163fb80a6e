//! Named groups of units sharing a formation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sentinel_core::enums::FormationKind;
use sentinel_core::state::SquadSnapshot;
use sentinel_core::types::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    pub id: String,
    pub member_ids: Vec<String>,
    pub leader_id: String,
    pub formation: FormationKind,
}

impl Squad {
    pub fn snapshot(&self) -> SquadSnapshot {
        SquadSnapshot {
            squad_id: self.id.clone(),
            leader_id: self.leader_id.clone(),
            member_ids: self.member_ids.clone(),
            formation: self.formation,
        }
    }

    /// Per-member destinations around `point`, facing `heading`.
    pub fn slots(&self, point: Position, heading: f64, spacing: f64) -> Vec<(String, Position)> {
        let offsets = formation_offsets(self.formation, self.member_ids.len(), spacing, heading);
        self.member_ids
            .iter()
            .zip(offsets)
            .map(|(id, (dx, dy))| (id.clone(), Position::new(point.x + dx, point.y + dy)))
            .collect()
    }
}

/// Offsets (dx, dy) of `n` formation slots, slot 0 being the leader at the origin.
/// `heading` is the compass direction the formation faces.
pub fn formation_offsets(
    kind: FormationKind,
    n: usize,
    spacing: f64,
    heading: f64,
) -> Vec<(f64, f64)> {
    // (right, forward) in formation space
    let local: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let i_f = i as f64;
            match kind {
                FormationKind::Wedge => {
                    if i == 0 {
                        (0.0, 0.0)
                    } else {
                        let rank = ((i + 1) / 2) as f64;
                        let side = if i % 2 == 1 { -1.0 } else { 1.0 };
                        (side * rank * spacing, -rank * spacing)
                    }
                }
                FormationKind::Line => {
                    let centre = (n as f64 - 1.0) / 2.0;
                    ((i_f - centre) * spacing, 0.0)
                }
                FormationKind::Column => (0.0, -i_f * spacing),
                FormationKind::Circle => {
                    if i == 0 {
                        (0.0, 0.0)
                    } else {
                        let ring = n.saturating_sub(1).max(1) as f64;
                        let angle = std::f64::consts::TAU * (i_f - 1.0) / ring;
                        (spacing * angle.sin(), spacing * angle.cos())
                    }
                }
            }
        })
        .collect();

    let h = heading.to_radians();
    let right = (h.cos(), -h.sin());
    let forward = (h.sin(), h.cos());
    local
        .into_iter()
        .map(|(r, f)| (r * right.0 + f * forward.0, r * right.1 + f * forward.1))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SquadManager {
    squads: BTreeMap<String, Squad>,
    next_id: u32,
}

impl SquadManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form a squad; the first member leads. Members leave any previous squad.
    pub fn form(&mut self, member_ids: Vec<String>, formation: FormationKind) -> Option<String> {
        let leader_id = member_ids.first()?.clone();
        for id in &member_ids {
            self.remove_member(id);
        }
        self.next_id += 1;
        let id = format!("squad-{:03}", self.next_id);
        self.squads.insert(
            id.clone(),
            Squad {
                id: id.clone(),
                member_ids,
                leader_id,
                formation,
            },
        );
        Some(id)
    }

    pub fn get(&self, id: &str) -> Option<&Squad> {
        self.squads.get(id)
    }

    pub fn reform(&mut self, id: &str, formation: FormationKind) -> bool {
        match self.squads.get_mut(id) {
            Some(squad) => {
                squad.formation = formation;
                true
            }
            None => false,
        }
    }

    /// Drop a member from its squad, promoting a new leader or
    /// disbanding an emptied squad. Returns the affected squad id.
    pub fn remove_member(&mut self, member_id: &str) -> Option<String> {
        let squad_id = self
            .squads
            .values()
            .find(|s| s.member_ids.iter().any(|m| m == member_id))?
            .id
            .clone();
        let squad = self.squads.get_mut(&squad_id)?;
        squad.member_ids.retain(|m| m != member_id);
        if squad.member_ids.is_empty() {
            self.squads.remove(&squad_id);
        } else if squad.leader_id == member_id {
            squad.leader_id = squad.member_ids[0].clone();
        }
        Some(squad_id)
    }

    pub fn disband(&mut self, id: &str) -> Option<Squad> {
        self.squads.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Squad> {
        self.squads.values()
    }

    pub fn len(&self) -> usize {
        self.squads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }

    pub fn snapshots(&self) -> Vec<SquadSnapshot> {
        self.squads.values().map(Squad::snapshot).collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_wedge_north() {
        let o = formation_offsets(FormationKind::Wedge, 3, 2.0, 0.0);
        assert!(close(o[0], (0.0, 0.0)));
        assert!(close(o[1], (-2.0, -2.0)));
        assert!(close(o[2], (2.0, -2.0)));
    }

    #[test]
    fn test_column_east_trails_west() {
        let o = formation_offsets(FormationKind::Column, 3, 2.0, 90.0);
        assert!(close(o[1], (-2.0, 0.0)));
        assert!(close(o[2], (-4.0, 0.0)));
    }

    #[test]
    fn test_line_centred() {
        let o = formation_offsets(FormationKind::Line, 3, 1.0, 0.0);
        assert!(close(o[0], (-1.0, 0.0)));
        assert!(close(o[1], (0.0, 0.0)));
        assert!(close(o[2], (1.0, 0.0)));
    }

    #[test]
    fn test_circle_slots_on_radius() {
        let o = formation_offsets(FormationKind::Circle, 5, 3.0, 45.0);
        for &(dx, dy) in &o[1..] {
            assert!(((dx * dx + dy * dy).sqrt() - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_leader_promotion_and_disband() {
        let mut mgr = SquadManager::new();
        let id = mgr
            .form(vec!["a".into(), "b".into()], FormationKind::Line)
            .unwrap();
        assert_eq!(mgr.get(&id).unwrap().leader_id, "a");
        mgr.remove_member("a");
        assert_eq!(mgr.get(&id).unwrap().leader_id, "b");
        mgr.remove_member("b");
        assert!(mgr.get(&id).is_none());
        assert!(mgr.form(Vec::new(), FormationKind::Line).is_none());
    }

    #[test]
    fn test_member_moves_between_squads() {
        let mut mgr = SquadManager::new();
        let first = mgr
            .form(vec!["a".into(), "b".into()], FormationKind::Wedge)
            .unwrap();
        let second = mgr.form(vec!["b".into()], FormationKind::Column).unwrap();
        assert_eq!(mgr.get(&first).unwrap().member_ids, vec!["a".to_string()]);
        assert_eq!(mgr.get(&second).unwrap().member_ids, vec!["b".to_string()]);
    }
}
