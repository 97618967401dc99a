#[cfg(test)]
mod tests {
    use crate::commands::CombatCommand;
    use crate::components::*;
    use crate::config::CombatConfig;
    use crate::constants::*;
    use crate::enums::*;
    use crate::events::CombatEvent;
    use crate::state::CombatSnapshot;
    use crate::types::{Position, SimTime};

    #[test]
    fn test_faction_hostility() {
        assert!(Faction(1).is_hostile_to(Faction(2)));
        assert!(!Faction(3).is_hostile_to(Faction(3)));
    }

    #[test]
    fn test_combatant_id_none() {
        assert!(CombatantId::NONE.is_none());
        assert!(!CombatantId(7).is_none());
    }

    #[test]
    fn test_shield_display_clamps_negative() {
        let shield = Shield {
            points: -30.0,
            max: 50.0,
        };
        assert_eq!(shield.display(), 0.0);
        assert_eq!(Shield::full(50.0).display(), 50.0);
    }

    #[test]
    fn test_piercing_bypasses_shield() {
        assert!(DamageType::Piercing.bypasses_shield());
        assert!(!DamageType::Kinetic.bypasses_shield());
        assert!(!DamageType::Explosive.bypasses_shield());
    }

    #[test]
    fn test_position_step_toward_stops_at_target() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        let mid = a.step_toward(&b, 2.5);
        assert!((mid.range_to(&a) - 2.5).abs() < 1e-9);
        assert_eq!(a.step_toward(&b, 10.0), b);
    }

    #[test]
    fn test_bearing_north_is_zero() {
        let a = Position::ORIGIN;
        assert!(a.bearing_to(&Position::new(0.0, 10.0, 0.0)).abs() < 1e-9);
        let east = a.bearing_to(&Position::new(10.0, 0.0, 0.0));
        assert!((east - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        time.advance(DT);
        time.advance(DT);
        assert_eq!(time.tick, 2);
        assert!((time.elapsed_secs - 2.0 * DT).abs() < 1e-12);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = CombatConfig::from_json_str(r#"{ "targeting": { "switch_distance_margin": 5.0 } }"#)
            .unwrap();
        assert_eq!(config.targeting.switch_distance_margin, 5.0);
        assert_eq!(config.targeting.reselect_interval_secs, RESELECT_INTERVAL_SECS);
        assert_eq!(config.fixed_dt.0, DT);
        assert_eq!(config.pool.max_per_prototype, None);
    }

    #[test]
    fn test_config_sanitize_clamps_bad_values() {
        let config = CombatConfig::from_json_str(
            r#"{
                "fixed_dt": -1.0,
                "engagement": { "min_cooldown_secs": 0.0, "pursuit_stop_fraction": 3.0 },
                "targeting": { "switch_health_margin": -4.0 }
            }"#,
        )
        .unwrap();
        assert!(config.fixed_dt.0 > 0.0);
        assert_eq!(config.engagement.min_cooldown_secs, MIN_COOLDOWN_SECS);
        assert_eq!(config.engagement.pursuit_stop_fraction, 1.0);
        assert_eq!(config.targeting.switch_health_margin, 0.0);
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(CombatConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_weapon_defaults_from_json() {
        let weapon: Weapon = serde_json::from_str(
            r#"{
                "projectile": 1,
                "damage": 10.0,
                "cooldown_secs": 1.0,
                "cannon_points": [{ "x": 0.0, "y": 1.0, "z": 0.0 }],
                "projectile_speed": 30.0,
                "max_lifespan_secs": 2.0
            }"#,
        )
        .unwrap();
        assert_eq!(weapon.crit_multiplier, CRIT_MULTIPLIER);
        assert_eq!(weapon.trajectory, TrajectoryKind::Straight);
        assert_eq!(weapon.aoe_radius, None);
        assert!(weapon.is_ready());
    }

    #[test]
    fn test_command_tagged_json() {
        let cmd = CombatCommand::DetectionEnter {
            observer: CombatantId(1),
            other: CombatantId(2),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains(r#""type":"DetectionEnter""#));
        let back: CombatCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_event_tagged_json() {
        let event = CombatEvent::Damaged {
            defender: CombatantId(4),
            amount: 12.5,
            damage_type: DamageType::Energy,
            critical: true,
            route: DamageRoute::Shield,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"Damaged""#));
        assert!(json.contains(r#""route":"Shield""#));
    }

    #[test]
    fn test_empty_snapshot_serializes() {
        let json = serde_json::to_string(&CombatSnapshot::default()).unwrap();
        assert!(json.contains("\"combatants\":[]"));
    }
}
