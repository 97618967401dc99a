#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use glam::DVec3;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use skirmish_core::enums::{DamageRoute, DamageType, EngagementState, TargetPolicy, TrajectoryKind};

    use crate::damage::*;
    use crate::fsm::*;
    use crate::selection::*;
    use crate::trajectory::*;

    /// Every roll comes out as 0.0: crits and dodges always succeed when their chance is > 0.
    fn always_low() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every roll comes out just below 1.0: nothing succeeds unless its chance is 1.
    fn always_high() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn defender(health: f64, shield: f64, dodge_chance: f64) -> DefenderState {
        DefenderState {
            health,
            shield,
            dodge_chance,
        }
    }

    // ---- Damage pipeline ----

    #[test]
    fn test_full_dodge_ignores_crit() {
        let input = DamageInput {
            base_damage: 50.0,
            damage_type: DamageType::Kinetic,
            crit_chance: 1.0,
            crit_multiplier: 3.0,
            falloff: 1.0,
        };
        let result = resolve(&input, &defender(100.0, 20.0, 1.0), &mut always_low());
        assert!(result.dodged());
        assert!(result.critical, "crit roll still happens before the dodge");
        assert_eq!(result.amount, 0.0);
        assert_eq!(result.shield_after, 20.0);
        assert_eq!(result.health_after, 100.0);
        assert!(!result.killed);
    }

    #[test]
    fn test_full_dodge_over_many_seeded_rolls() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let input = DamageInput {
            base_damage: 30.0,
            damage_type: DamageType::Energy,
            crit_chance: 0.5,
            crit_multiplier: 2.0,
            falloff: 1.0,
        };
        for _ in 0..500 {
            let result = resolve(&input, &defender(80.0, 0.0, 1.0), &mut rng);
            assert_eq!(result.route, DamageRoute::Dodged);
            assert_eq!(result.health_after, 80.0);
        }
    }

    #[test]
    fn test_shield_absorbs_whole_hit_without_carry_over() {
        let input = DamageInput::flat(80.0, DamageType::Kinetic);
        let result = resolve(&input, &defender(100.0, 50.0, 0.0), &mut always_high());
        assert_eq!(result.route, DamageRoute::Shield);
        assert_eq!(result.amount, 80.0);
        assert_eq!(result.shield_after, 0.0);
        assert_eq!(result.health_after, 100.0, "overflow is not carried into health");
    }

    #[test]
    fn test_depleted_shield_routes_to_health() {
        let input = DamageInput::flat(30.0, DamageType::Kinetic);
        let result = resolve(&input, &defender(100.0, 0.0, 0.0), &mut always_high());
        assert_eq!(result.route, DamageRoute::Health);
        assert_eq!(result.health_after, 70.0);
        assert_eq!(result.shield_after, 0.0);
    }

    #[test]
    fn test_piercing_skips_shield() {
        let input = DamageInput::flat(30.0, DamageType::Piercing);
        let result = resolve(&input, &defender(100.0, 50.0, 0.0), &mut always_high());
        assert_eq!(result.route, DamageRoute::Health);
        assert_eq!(result.shield_after, 50.0);
        assert_eq!(result.health_after, 70.0);
    }

    #[test]
    fn test_crit_multiplies_damage() {
        let input = DamageInput {
            base_damage: 10.0,
            damage_type: DamageType::Kinetic,
            crit_chance: 0.25,
            crit_multiplier: 2.5,
            falloff: 1.0,
        };
        let crit = resolve(&input, &defender(100.0, 0.0, 0.0), &mut always_low());
        assert!(crit.critical);
        assert_eq!(crit.amount, 25.0);

        let normal = resolve(&input, &defender(100.0, 0.0, 0.0), &mut always_high());
        assert!(!normal.critical);
        assert_eq!(normal.amount, 10.0);
    }

    #[test]
    fn test_lethal_hit_reports_kill_once() {
        let input = DamageInput::flat(150.0, DamageType::Explosive);
        let first = resolve(&input, &defender(100.0, 0.0, 0.0), &mut always_high());
        assert!(first.killed);
        assert_eq!(first.health_after, 0.0);

        let again = resolve(&input, &defender(0.0, 0.0, 0.0), &mut always_high());
        assert!(!again.killed, "an already-dead defender is not killed twice");
    }

    #[test]
    fn test_falloff_is_applied_before_crit() {
        let input = DamageInput {
            base_damage: 40.0,
            damage_type: DamageType::Explosive,
            crit_chance: 1.0,
            crit_multiplier: 2.0,
            falloff: falloff_multiplier(5.0, 10.0),
        };
        let result = resolve(&input, &defender(100.0, 0.0, 0.0), &mut always_low());
        assert_eq!(result.amount, 40.0);
    }

    #[test]
    fn test_falloff_edges() {
        assert_eq!(falloff_multiplier(0.0, 10.0), 1.0);
        assert_eq!(falloff_multiplier(10.0, 10.0), 0.0);
        assert_eq!(falloff_multiplier(25.0, 10.0), 0.0);
        assert!((falloff_multiplier(2.5, 10.0) - 0.75).abs() < 1e-12);
        assert_eq!(falloff_multiplier(0.0, 0.0), 1.0);
        assert_eq!(falloff_multiplier(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_knockback_is_stronger_up_close() {
        let source = DVec3::ZERO;
        let near = knockback_impulse(10.0, source, DVec3::new(1.0, 0.0, 0.0));
        let far = knockback_impulse(10.0, source, DVec3::new(9.0, 0.0, 0.0));
        assert!(near.length() > far.length());
        assert!((near.length() - 5.0).abs() < 1e-9);
        assert!(near.x > 0.0, "pushes away from the source");
        assert_eq!(knockback_impulse(0.0, source, DVec3::X), DVec3::ZERO);
        assert_eq!(knockback_impulse(4.0, source, source), DVec3::new(0.0, 0.0, 4.0));
    }

    // ---- Target selection ----

    fn candidate(distance: f64, health: f64) -> CandidateInfo {
        CandidateInfo { distance, health }
    }

    const MARGINS: SwitchMargins = SwitchMargins {
        distance: 2.0,
        health: 10.0,
    };

    #[test]
    fn test_closest_picks_minimum_distance() {
        let set = [candidate(8.0, 50.0), candidate(3.0, 90.0), candidate(5.0, 10.0)];
        assert_eq!(select(&set, TargetPolicy::Closest, None, &MARGINS), Some(1));
    }

    #[test]
    fn test_health_policies() {
        let set = [candidate(8.0, 50.0), candidate(3.0, 90.0), candidate(5.0, 10.0)];
        assert_eq!(select(&set, TargetPolicy::LowestHealth, None, &MARGINS), Some(2));
        assert_eq!(select(&set, TargetPolicy::HighestHealth, None, &MARGINS), Some(1));
    }

    #[test]
    fn test_ties_go_to_first_encountered() {
        let set = [candidate(4.0, 20.0), candidate(4.0, 20.0), candidate(4.0, 20.0)];
        assert_eq!(best(&set, TargetPolicy::Closest), Some(0));
        assert_eq!(best(&set, TargetPolicy::LowestHealth), Some(0));
        assert_eq!(best(&set, TargetPolicy::HighestHealth), Some(0));
    }

    #[test]
    fn test_empty_set_selects_nothing() {
        assert_eq!(select(&[], TargetPolicy::Closest, None, &MARGINS), None);
    }

    #[test]
    fn test_no_switch_within_margin() {
        // Challenger is 1.5 m closer, margin is 2 m.
        let set = [candidate(10.0, 50.0), candidate(8.5, 50.0)];
        assert_eq!(select(&set, TargetPolicy::Closest, Some(0), &MARGINS), Some(0));
    }

    #[test]
    fn test_no_switch_at_exact_margin() {
        let set = [candidate(10.0, 50.0), candidate(8.0, 50.0)];
        assert_eq!(select(&set, TargetPolicy::Closest, Some(0), &MARGINS), Some(0));
    }

    #[test]
    fn test_switch_beyond_margin() {
        let set = [candidate(10.0, 50.0), candidate(7.0, 50.0)];
        assert_eq!(select(&set, TargetPolicy::Closest, Some(0), &MARGINS), Some(1));
    }

    #[test]
    fn test_health_hysteresis() {
        let set = [candidate(5.0, 60.0), candidate(5.0, 55.0)];
        assert_eq!(select(&set, TargetPolicy::LowestHealth, Some(0), &MARGINS), Some(0));
        let set = [candidate(5.0, 60.0), candidate(5.0, 45.0)];
        assert_eq!(select(&set, TargetPolicy::LowestHealth, Some(0), &MARGINS), Some(1));
    }

    #[test]
    fn test_out_of_range_incumbent_is_ignored() {
        let set = [candidate(10.0, 50.0), candidate(9.0, 50.0)];
        assert_eq!(select(&set, TargetPolicy::Closest, Some(7), &MARGINS), Some(1));
    }

    // ---- Engagement FSM ----

    fn context(state: EngagementState, distance: Option<f64>, ready: bool) -> EngagementContext {
        EngagementContext {
            state,
            disabled: false,
            target_distance: distance,
            attack_radius: 10.0,
            detection_radius: 30.0,
            lost_target_tolerance: 0.1,
            weapon_ready: ready,
        }
    }

    #[test]
    fn test_idle_without_target() {
        let update = evaluate(&context(EngagementState::Idle, None, true));
        assert_eq!(update.new_state, EngagementState::Idle);
        assert!(!update.state_changed);
        assert!(!update.fire);
    }

    #[test]
    fn test_pursue_outside_attack_radius() {
        let update = evaluate(&context(EngagementState::Idle, Some(20.0), true));
        assert_eq!(update.new_state, EngagementState::Pursuing);
        assert!(update.state_changed);
        assert!(!update.fire);
    }

    #[test]
    fn test_attack_and_fire_when_ready() {
        let update = evaluate(&context(EngagementState::Pursuing, Some(10.0), true));
        assert_eq!(update.new_state, EngagementState::Attacking);
        assert!(update.fire);

        let cooling = evaluate(&context(EngagementState::Attacking, Some(5.0), false));
        assert_eq!(cooling.new_state, EngagementState::Attacking);
        assert!(!cooling.state_changed);
        assert!(!cooling.fire);
    }

    #[test]
    fn test_tolerance_buffer_keeps_target() {
        // 31 m is outside the 30 m detection radius but inside 33 m tolerance.
        let update = evaluate(&context(EngagementState::Pursuing, Some(31.0), true));
        assert_eq!(update.new_state, EngagementState::Pursuing);
        assert!(!update.drop_target);
    }

    #[test]
    fn test_target_lost_beyond_tolerance() {
        let update = evaluate(&context(EngagementState::Pursuing, Some(34.0), true));
        assert_eq!(update.new_state, EngagementState::Idle);
        assert!(update.drop_target);
        assert!(!update.fire);
    }

    #[test]
    fn test_disabled_goes_idle_and_drops_target() {
        let mut ctx = context(EngagementState::Attacking, Some(5.0), true);
        ctx.disabled = true;
        let update = evaluate(&ctx);
        assert_eq!(update.new_state, EngagementState::Idle);
        assert!(update.drop_target);
        assert!(!update.fire);
    }

    #[test]
    fn test_stop_distance_and_lost_range() {
        assert!((pursuit_stop_distance(10.0, 0.9) - 9.0).abs() < 1e-12);
        assert!((lost_target_range(30.0, 0.1) - 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_turn_toward_wraps_shortest_way() {
        let (yaw, _) = turn_toward((0.1, 0.0), (TAU - 0.1, 0.0), 0.05);
        assert!((yaw - 0.05).abs() < 1e-9, "turns left across north, got {yaw}");
        let (yaw, pitch) = turn_toward((0.0, 0.0), (FRAC_PI_2, 0.2), PI);
        assert!((yaw - FRAC_PI_2).abs() < 1e-9);
        assert!((pitch - 0.2).abs() < 1e-9);
    }

    // ---- Trajectories ----

    const PARAMS: TrajectoryParams = TrajectoryParams {
        amplitude: 1.5,
        frequency_hz: 2.0,
        blend_distance: 5.0,
    };

    fn fly(kind: TrajectoryKind, destination: DVec3, max_ticks: usize) -> (Vec<DVec3>, bool) {
        let dt = 1.0 / 30.0;
        let mut base = DVec3::ZERO;
        let mut travelled = 0.0;
        let mut path = Vec::new();
        for tick in 1..=max_ticks {
            let step = advance(
                kind,
                base,
                destination,
                30.0,
                dt,
                tick as f64 * dt,
                travelled,
                &PARAMS,
                0.05,
            );
            base = step.base;
            travelled += step.travelled;
            path.push(step.position);
            if step.arrived {
                return (path, true);
            }
        }
        (path, false)
    }

    #[test]
    fn test_straight_reaches_destination() {
        let destination = DVec3::new(0.0, 30.0, 0.0);
        let (path, arrived) = fly(TrajectoryKind::Straight, destination, 40);
        assert!(arrived);
        assert_eq!(*path.last().unwrap(), destination);
        assert!(path.iter().all(|p| p.x == 0.0 && p.z == 0.0));
    }

    #[test]
    fn test_every_kind_converges() {
        let destination = DVec3::new(20.0, 20.0, 5.0);
        for kind in [
            TrajectoryKind::Straight,
            TrajectoryKind::Wavering,
            TrajectoryKind::Zigzag,
            TrajectoryKind::Circular,
        ] {
            let (path, arrived) = fly(kind, destination, 200);
            assert!(arrived, "{kind:?} never arrived");
            assert_eq!(*path.last().unwrap(), destination);
        }
    }

    #[test]
    fn test_wavering_deviates_mid_flight() {
        let destination = DVec3::new(0.0, 60.0, 0.0);
        let (path, _) = fly(TrajectoryKind::Wavering, destination, 200);
        let max_lateral = path.iter().map(|p| p.x.abs()).fold(0.0, f64::max);
        assert!(max_lateral > 0.5, "expected visible oscillation, got {max_lateral}");
        assert!(max_lateral <= PARAMS.amplitude + 1e-9);
    }

    #[test]
    fn test_circular_uses_vertical_axis() {
        let destination = DVec3::new(0.0, 60.0, 0.0);
        let (path, _) = fly(TrajectoryKind::Circular, destination, 200);
        assert!(path.iter().any(|p| p.z.abs() > 0.5));
        assert!(path.iter().any(|p| p.x.abs() > 0.5));
    }

    #[test]
    fn test_trajectories_are_reproducible() {
        let destination = DVec3::new(-12.0, 40.0, 3.0);
        let (a, _) = fly(TrajectoryKind::Zigzag, destination, 200);
        let (b, _) = fly(TrajectoryKind::Zigzag, destination, 200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_offset_is_zero_at_launch() {
        let offset = lateral_offset(TrajectoryKind::Circular, DVec3::Y, 0.0, 0.0, 50.0, &PARAMS);
        assert_eq!(offset, DVec3::ZERO);
    }

    #[test]
    fn test_lateral_basis_vertical_forward() {
        let (right, up) = lateral_basis(DVec3::Z);
        assert!((right.length() - 1.0).abs() < 1e-12);
        assert!(right.dot(DVec3::Z).abs() < 1e-12);
        assert!(up.dot(DVec3::Z).abs() < 1e-12);
    }
}
