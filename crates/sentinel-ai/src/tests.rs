#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Instant;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use sentinel_core::enums::{Alliance, AssetType, NpcKind, ThreatLevel, UnitState};
    use sentinel_core::target::Target;
    use sentinel_core::types::Position;

    use crate::behavior::{BehaviorCoordinator, UnitView};
    use crate::npc::*;

    fn pedestrian_with(aggression: f64) -> (Brain, Target) {
        let brain = Brain::new(
            NpcKind::Pedestrian,
            Personality::default().with_aggression(aggression),
            0.0,
        );
        let target = Target::new("ped-1", "Pedestrian 1", Alliance::Neutral, AssetType::Person, Position::ORIGIN);
        (brain, target)
    }

    fn feed_eliminations(brain: &mut Brain, count: usize) {
        for i in 0..count {
            brain.memory.record(MemoryEvent {
                kind: MemoryKind::Elimination,
                time: i as f64,
                position: Position::new(10.0, 0.0),
                distance: 10.0,
                intensity: 1.0 - 10.0 / 60.0,
            });
        }
    }

    #[test]
    fn test_aggressive_pedestrian_radicalizes_at_red() {
        let (mut brain, mut target) = pedestrian_with(0.9);
        feed_eliminations(&mut brain, 3);
        let flipped = AllianceManager::default().check(&mut brain, &mut target, ThreatLevel::Red, 5.0);
        assert!(flipped);
        assert_eq!(target.alliance(), Alliance::Hostile);
        assert!(target.is_combatant());
        assert!(target.weapon.is_some());
        assert_eq!(brain.state(), NpcState::Spawning);
    }

    #[test]
    fn test_mild_pedestrian_stays_neutral() {
        let (mut brain, mut target) = pedestrian_with(0.3);
        feed_eliminations(&mut brain, 3);
        let flipped = AllianceManager::default().check(&mut brain, &mut target, ThreatLevel::Red, 5.0);
        assert!(!flipped);
        assert_eq!(target.alliance(), Alliance::Neutral);
        assert!(!target.is_combatant());
        assert_ne!(brain.state(), NpcState::Spawning);
    }

    #[test]
    fn test_no_radicalization_below_red_or_threshold() {
        let (mut brain, mut target) = pedestrian_with(0.9);
        feed_eliminations(&mut brain, 3);
        let manager = AllianceManager::default();
        assert!(!manager.check(&mut brain, &mut target, ThreatLevel::Orange, 5.0));

        let (mut brain, mut target) = pedestrian_with(0.9);
        feed_eliminations(&mut brain, 2);
        assert!(!manager.check(&mut brain, &mut target, ThreatLevel::Red, 5.0));
        assert_eq!(target.alliance(), Alliance::Neutral);
    }

    #[test]
    fn test_broadcast_raises_danger_and_pedestrian_flees() {
        let mut layer = CognitionLayer::default();
        layer.insert("ped-1", Brain::new(NpcKind::Pedestrian, Personality::default(), 0.0));
        let mut positions = BTreeMap::new();
        positions.insert("ped-1".to_string(), Position::new(3.0, 0.0));

        for i in 0..3 {
            let reached = layer.broadcast(
                &Stimulus {
                    kind: MemoryKind::Elimination,
                    position: Position::ORIGIN,
                    source_id: Some(format!("victim-{i}")),
                    time: 0.0,
                },
                &positions,
            );
            assert_eq!(reached, 1);
        }
        let updates = layer.tick(0.1, 0.1, &positions);
        assert_eq!(updates.len(), 1);
        assert!(matches!(
            updates[0].1.to,
            NpcState::Panicking | NpcState::Fleeing | NpcState::Hiding
        ));
    }

    #[test]
    fn test_bound_brain_takes_no_fallback_actions() {
        let mut layer = CognitionLayer::default();
        layer.insert("ped-1", Brain::new(NpcKind::Pedestrian, Personality::default(), 0.0));
        assert!(layer.set_bound("ped-1", true));
        assert!(!layer.set_bound("nobody", true));
        layer.get_mut("ped-1").unwrap().memory.raise_danger(1.0);
        let mut positions = BTreeMap::new();
        positions.insert("ped-1".to_string(), Position::ORIGIN);
        assert!(layer.tick(1.0, 0.1, &positions).is_empty());
        assert_eq!(layer.get("ped-1").unwrap().state(), NpcState::Walking);
    }

    #[test]
    fn test_seventy_brains_tick_under_budget() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut layer = CognitionLayer::default();
        let mut positions = BTreeMap::new();
        let kinds = [NpcKind::Pedestrian, NpcKind::Vehicle, NpcKind::Animal];
        for i in 0..70 {
            let id = format!("npc-{i:03}");
            let kind = kinds[i % kinds.len()];
            layer.insert(id.clone(), Brain::new(kind, Personality::random(&mut rng), 0.0));
            positions.insert(id, Position::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)));
        }
        // Warm up allocations once.
        layer.tick(0.0, 0.1, &positions);

        let mut best = f64::INFINITY;
        for n in 1..=5 {
            let now = n as f64 * 0.1;
            let start = Instant::now();
            layer.tick(now, 0.1, &positions);
            layer.broadcast(
                &Stimulus {
                    kind: MemoryKind::WeaponDischarge,
                    position: Position::ORIGIN,
                    source_id: Some(format!("shooter-{n}")),
                    time: now,
                },
                &positions,
            );
            best = best.min(start.elapsed().as_secs_f64());
        }
        assert!(best < 0.005, "cognition tick took {:.3} ms", best * 1000.0);
    }

    #[test]
    fn test_coordinator_dispatches_by_category() {
        let mut coord = BehaviorCoordinator::new(1, Position::ORIGIN);
        let units = vec![
            UnitView::new("turret-1", Alliance::Friendly, AssetType::Turret, Position::ORIGIN),
            UnitView::new("rover-1", Alliance::Friendly, AssetType::Rover, Position::new(0.0, 2.0)),
            UnitView::new("hostile-1", Alliance::Hostile, AssetType::Person, Position::new(0.0, 10.0)),
            UnitView::new("cam-1", Alliance::Friendly, AssetType::Camera, Position::new(5.0, 5.0)),
            UnitView::new("ped-1", Alliance::Neutral, AssetType::Person, Position::new(1.0, 1.0)),
        ];
        let decisions = coord.tick(0.1, &units);
        let ids: Vec<&str> = decisions.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["hostile-1", "rover-1", "turret-1"]);

        let turret = &decisions[2].1;
        assert_eq!(turret.state, UnitState::Engaging);
        assert_eq!(turret.fire.as_ref().unwrap().target_id, "hostile-1");
        let rover = &decisions[1].1;
        assert_eq!(rover.speed_scale, 0.0);
    }

    #[test]
    fn test_turret_cooldown_and_tracking_states() {
        let mut coord = BehaviorCoordinator::new(1, Position::ORIGIN);
        let mut turret = UnitView::new("turret-1", Alliance::Friendly, AssetType::Turret, Position::ORIGIN);
        turret.weapon_ready = false;
        let near = UnitView::new("h", Alliance::Hostile, AssetType::Person, Position::new(0.0, 10.0));
        let d = coord.tick(0.1, &[turret.clone(), near]);
        let t = d.iter().find(|(id, _)| id == "turret-1").unwrap();
        assert_eq!(t.1.state, UnitState::Cooldown);
        assert!(t.1.fire.is_none());

        // Turret range 20, tracking out to 30.
        let far = UnitView::new("h", Alliance::Hostile, AssetType::Person, Position::new(0.0, 25.0));
        let d = coord.tick(0.1, &[turret, far]);
        let t = d.iter().find(|(id, _)| id == "turret-1").unwrap();
        assert_eq!(t.1.state, UnitState::Tracking);
    }

    #[test]
    fn test_crippled_robot_returns_home() {
        let mut coord = BehaviorCoordinator::new(1, Position::ORIGIN);
        let mut drone = UnitView::new("drone-1", Alliance::Friendly, AssetType::Drone, Position::new(30.0, 0.0));
        drone.health_fraction = 0.1;
        let d = coord.tick(0.1, &[drone]);
        assert_eq!(d[0].1.state, UnitState::Returning);
        assert_eq!(d[0].1.detour, Some(Position::ORIGIN));
    }
}
