//! Target selector system.
//!
//! Re-selects each attacker's target on a fixed interval, or immediately when
//! the current target became invalid or a new candidate entered. A challenger
//! must beat the incumbent by more than the policy's switch margin.
//!
//! Candidates beyond the lost-target range are never chosen, so a target the
//! engagement machine just dropped for range is not picked straight back up.

use hecs::{Entity, World};

use skirmish_core::components::{Combatant, CombatantId, Health, Scale, Sensors, Status};
use skirmish_core::config::TargetingConfig;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::Position;
use skirmish_rules::fsm::lost_target_range;
use skirmish_rules::selection::{self, CandidateInfo, SwitchMargins};

use crate::tracking::{is_valid_target, Candidates, Targeting};

struct Pending {
    attacker: Entity,
    attacker_id: CombatantId,
    new_target: Option<Entity>,
    changed: bool,
}

/// Run target selection for every attacker.
pub fn run(
    world: &mut World,
    dt: f64,
    config: &TargetingConfig,
    lost_target_tolerance: f64,
    events: &mut Vec<CombatEvent>,
) {
    let margins = SwitchMargins {
        distance: config.switch_distance_margin,
        health: config.switch_health_margin,
    };

    let mut pending: Vec<Pending> = Vec::new();
    let mut timers: Vec<Entity> = Vec::new();

    for (attacker, (targeting, candidates, combatant, pos, status, sensors, scale)) in world
        .query::<(
            &Targeting,
            &Candidates,
            &Combatant,
            &Position,
            &Status,
            &Sensors,
            Option<&Scale>,
        )>()
        .iter()
    {
        if !status.alive || status.disabled {
            continue;
        }
        let scale = scale.copied().unwrap_or_default().0;
        let max_range = lost_target_range(sensors.detection_radius * scale, lost_target_tolerance);
        let in_range = |other: Entity| {
            world
                .get::<&Position>(other)
                .is_ok_and(|p| pos.range_to(&p) <= max_range)
        };

        let incumbent_valid = targeting.current.is_some_and(|t| {
            candidates.contains(t) && is_valid_target(world, t) && in_range(t)
        });
        let force = targeting.force_reselect || (targeting.current.is_some() && !incumbent_valid);
        if !force && targeting.reselect_timer_secs - dt > 0.0 {
            timers.push(attacker);
            continue;
        }

        // Valid, in-range candidates in insertion order.
        let mut entities: Vec<Entity> = Vec::with_capacity(candidates.len());
        let mut infos: Vec<CandidateInfo> = Vec::with_capacity(candidates.len());
        for &other in &candidates.entries {
            if !is_valid_target(world, other) {
                continue;
            }
            let (Ok(other_pos), Ok(health)) =
                (world.get::<&Position>(other), world.get::<&Health>(other))
            else {
                continue;
            };
            let distance = pos.range_to(&other_pos);
            if distance > max_range {
                continue;
            }
            entities.push(other);
            infos.push(CandidateInfo {
                distance,
                health: health.current,
            });
        }

        let incumbent = if incumbent_valid {
            targeting
                .current
                .and_then(|t| entities.iter().position(|e| *e == t))
        } else {
            None
        };
        let chosen = selection::select(&infos, targeting.policy, incumbent, &margins)
            .map(|idx| entities[idx]);

        pending.push(Pending {
            attacker,
            attacker_id: combatant.id,
            new_target: chosen,
            changed: chosen != targeting.current,
        });
    }

    for attacker in timers {
        if let Ok(mut targeting) = world.get::<&mut Targeting>(attacker) {
            targeting.reselect_timer_secs -= dt;
        }
    }

    for p in pending {
        let target_id = p
            .new_target
            .and_then(|t| world.get::<&Combatant>(t).ok().map(|c| c.id))
            .unwrap_or(CombatantId::NONE);
        if let Ok(mut targeting) = world.get::<&mut Targeting>(p.attacker) {
            targeting.current = p.new_target;
            targeting.reselect_timer_secs = config.reselect_interval_secs;
            targeting.force_reselect = false;
        }
        if p.changed {
            tracing::debug!(attacker = p.attacker_id.0, target = target_id.0, "target changed");
            events.push(CombatEvent::TargetChanged {
                combatant: p.attacker_id,
                target: target_id,
            });
        }
    }
}
