#[cfg(test)]
mod tests {
    use crate::commands::{Command, TargetSpec};
    use crate::enums::*;
    use crate::events::{EventEnvelope, SimEvent, Topic};
    use crate::profiles::profile;
    use crate::target::Target;
    use crate::types::{angle_delta, wrap_degrees, Position};

    fn person(alliance: Alliance) -> Target {
        Target::new("p-1", "Person 1", alliance, AssetType::Person, Position::ORIGIN)
    }

    #[test]
    fn test_bearing_compass_convention() {
        let o = Position::ORIGIN;
        assert!((o.bearing_to(&Position::new(0.0, 10.0)) - 0.0).abs() < 1e-9);
        assert!((o.bearing_to(&Position::new(10.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((o.bearing_to(&Position::new(0.0, -10.0)) - 180.0).abs() < 1e-9);
        assert!((o.bearing_to(&Position::new(-10.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_by_heading_round_trip() {
        let p = Position::new(3.0, 4.0).offset_by_heading(90.0, 5.0);
        assert!((p.x - 8.0).abs() < 1e-9);
        assert!((p.y - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_helpers() {
        assert!((angle_delta(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angle_delta(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert!((angle_delta(0.0, 180.0) - 180.0).abs() < 1e-9);
        assert!((wrap_degrees(-90.0) - 270.0).abs() < 1e-9);
        assert!((wrap_degrees(720.0)).abs() < 1e-9);
    }

    #[test]
    fn test_damage_clamps_and_eliminates() {
        let mut t = person(Alliance::Hostile);
        assert!(!t.apply_damage(30.0));
        assert!((t.health() - 50.0).abs() < 1e-9);
        assert!(t.apply_damage(500.0));
        assert_eq!(t.health(), 0.0);
        assert_eq!(t.status(), TargetStatus::Eliminated);
        // Dead targets take no further damage and cannot heal.
        assert!(!t.apply_damage(10.0));
        t.heal(50.0);
        assert_eq!(t.health(), 0.0);
    }

    #[test]
    fn test_negative_damage_does_not_heal() {
        let mut t = person(Alliance::Hostile);
        t.apply_damage(-100.0);
        assert_eq!(t.health(), t.max_health());
    }

    #[test]
    fn test_battery_clamped() {
        let mut t = Target::new("r", "Rover", Alliance::Friendly, AssetType::Rover, Position::ORIGIN);
        t.set_battery(1.7);
        assert_eq!(t.battery(), 1.0);
        t.drain_battery(5.0);
        assert_eq!(t.battery(), 0.0);
        t.set_battery(f64::NAN);
        assert_eq!(t.battery(), 0.0);
    }

    #[test]
    fn test_terminal_status_is_final() {
        let mut t = person(Alliance::Hostile);
        t.set_status(TargetStatus::Escaped).unwrap();
        assert!(t.set_status(TargetStatus::Active).is_err());
        assert_eq!(t.status(), TargetStatus::Escaped);
    }

    #[test]
    fn test_alliance_transitions() {
        let mut friendly = Target::new("t", "T", Alliance::Friendly, AssetType::Turret, Position::ORIGIN);
        assert!(friendly.set_alliance(Alliance::Hostile).is_err());

        let mut neutral = person(Alliance::Neutral);
        assert!(!neutral.is_combatant());
        neutral.radicalize().unwrap();
        assert_eq!(neutral.alliance(), Alliance::Hostile);
        assert!(neutral.is_combatant());

        let mut unknown = person(Alliance::Unknown);
        unknown.set_alliance(Alliance::Friendly).unwrap();
        assert!(unknown.is_combatant());
    }

    #[test]
    fn test_radicalized_animal_gets_a_weapon() {
        let mut dog = Target::new("a", "Dog", Alliance::Neutral, AssetType::Animal, Position::ORIGIN);
        assert!(dog.weapon.is_none());
        dog.radicalize().unwrap();
        assert!(dog.weapon.is_some());
    }

    #[test]
    fn test_zero_speed_with_waypoints_is_stationary() {
        let mut t = person(Alliance::Neutral);
        t.waypoints = vec![Position::new(5.0, 5.0)];
        t.speed = 0.0;
        t.refresh_motion_status(false);
        assert_eq!(t.status(), TargetStatus::Stationary);
        t.speed = 1.0;
        t.refresh_motion_status(false);
        assert_eq!(t.status(), TargetStatus::Active);
        t.waypoints.clear();
        t.refresh_motion_status(true);
        assert_eq!(t.status(), TargetStatus::Arrived);
    }

    #[test]
    fn test_low_battery_status() {
        let mut t = Target::new("d", "Drone", Alliance::Friendly, AssetType::Drone, Position::ORIGIN);
        t.set_battery(0.05);
        t.refresh_motion_status(false);
        assert_eq!(t.status(), TargetStatus::LowBattery);
    }

    #[test]
    fn test_stationary_types_have_no_speed() {
        for asset in AssetType::ALL {
            let p = profile(asset);
            if asset.is_mobile() {
                assert!(p.base_speed > 0.0, "{asset:?} should move");
            } else {
                assert_eq!(p.base_speed, 0.0, "{asset:?} should be fixed");
            }
        }
    }

    #[test]
    fn test_alliance_opposition() {
        assert!(Alliance::Friendly.opposes(Alliance::Hostile));
        assert!(Alliance::Hostile.opposes(Alliance::Friendly));
        assert!(!Alliance::Hostile.opposes(Alliance::Neutral));
        assert!(!Alliance::Friendly.opposes(Alliance::Friendly));
    }

    #[test]
    fn test_event_envelope_serializes_flat() {
        let env = EventEnvelope {
            tick: 7,
            time_secs: 0.7,
            event: SimEvent::HazardExpired {
                hazard_id: "hazard-1".into(),
            },
        };
        assert_eq!(env.topic(), Topic::HazardExpired);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["type"], "hazard_expired");
        assert_eq!(json["tick"], 7);
        assert_eq!(json["hazard_id"], "hazard-1");
    }

    #[test]
    fn test_command_parses_from_json() {
        let json = r#"{"type":"dispatch","target_id":"rover-1","destination":{"x":4.0,"y":2.0}}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::Dispatch {
                target_id: "rover-1".into(),
                destination: Position::new(4.0, 2.0)
            }
        );

        let add = Command::AddTarget(TargetSpec::new(
            Alliance::Friendly,
            AssetType::Turret,
            Position::ORIGIN,
        ));
        let text = serde_json::to_string(&add).unwrap();
        assert!(text.contains("\"type\":\"add_target\""));
        assert!(text.contains("\"asset_type\":\"turret\""));
    }

    #[test]
    fn test_snapshot_schema_fields() {
        let t = person(Alliance::Neutral);
        let json = serde_json::to_value(t.snapshot()).unwrap();
        for key in [
            "id", "name", "alliance", "asset_type", "position", "heading", "speed", "battery",
            "health", "status", "is_combatant",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["alliance"], "neutral");
        assert!(json.get("fsm_state").is_none());
    }
}
