//! Engagement state machine system.
//!
//! Gathers an `EngagementContext` per attacker, evaluates the pure FSM from
//! `skirmish_rules::fsm`, then applies entry actions: move orders while
//! Pursuing, facing updates while Pursuing or Attacking, and firing on
//! cooldown while Attacking. Radii are scaled by the attacker's current
//! `Scale` every tick.

use hecs::{Entity, World};

use skirmish_core::components::{
    Combatant, CombatantId, Facing, MoveOrder, Scale, Sensors, Status, Weapon,
};
use skirmish_core::config::CombatConfig;
use skirmish_core::constants::MOVE_ORDER_REFRESH_DISTANCE;
use skirmish_core::enums::EngagementState;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::Position;
use skirmish_rules::fsm::{self, EngagementContext, EngagementUpdate};

use crate::projectile::PoolManager;
use crate::systems::projectiles;
use crate::tracking::{is_valid_target, Engagement, Targeting};

/// Tick weapon cooldowns down toward zero. Runs on the fixed tick.
pub fn tick_cooldowns(world: &mut World, dt: f64) {
    for (_entity, weapon) in world.query_mut::<&mut Weapon>() {
        weapon.cooldown_remaining_secs = (weapon.cooldown_remaining_secs - dt).max(0.0);
    }
}

struct Evaluated {
    attacker: Entity,
    id: CombatantId,
    from: EngagementState,
    update: EngagementUpdate,
    target: Option<(Entity, Position)>,
    attack_radius: f64,
}

/// Evaluate and apply the state machine for every attacker.
pub fn run(
    world: &mut World,
    pools: &mut PoolManager,
    config: &CombatConfig,
    dt: f64,
    events: &mut Vec<CombatEvent>,
) {
    let mut evaluated: Vec<Evaluated> = Vec::new();

    for (attacker, (engagement, targeting, combatant, pos, sensors, scale, status, weapon)) in
        world
            .query::<(
                &Engagement,
                &Targeting,
                &Combatant,
                &Position,
                &Sensors,
                Option<&Scale>,
                &Status,
                Option<&Weapon>,
            )>()
            .iter()
    {
        let scale = scale.copied().unwrap_or_default().0;
        let target = targeting
            .current
            .filter(|t| is_valid_target(world, *t))
            .and_then(|t| world.get::<&Position>(t).ok().map(|p| (t, *p)));

        let ctx = EngagementContext {
            state: engagement.state,
            disabled: !status.alive || status.disabled,
            target_distance: target.map(|(_, p)| pos.range_to(&p)),
            attack_radius: sensors.attack_radius * scale,
            detection_radius: sensors.detection_radius * scale,
            lost_target_tolerance: config.engagement.lost_target_tolerance,
            weapon_ready: weapon.is_some_and(Weapon::is_ready),
        };
        let mut update = fsm::evaluate(&ctx);
        // A dangling reference is dropped even when the FSM keeps the state.
        if targeting.current.is_some() && target.is_none() {
            update.drop_target = true;
        }

        evaluated.push(Evaluated {
            attacker,
            id: combatant.id,
            from: engagement.state,
            update,
            target,
            attack_radius: ctx.attack_radius,
        });
    }

    for e in evaluated {
        apply(world, pools, config, dt, e, events);
    }
}

fn apply(
    world: &mut World,
    pools: &mut PoolManager,
    config: &CombatConfig,
    dt: f64,
    e: Evaluated,
    events: &mut Vec<CombatEvent>,
) {
    let to = e.update.new_state;

    if e.update.drop_target {
        clear_target(world, e.attacker, e.id, events);
    }

    if e.update.state_changed {
        if let Ok(mut engagement) = world.get::<&mut Engagement>(e.attacker) {
            engagement.state = to;
        }
        tracing::debug!(combatant = e.id.0, from = ?e.from, to = ?to, "engagement state changed");
        events.push(CombatEvent::StateChanged {
            combatant: e.id,
            from: e.from,
            to,
        });
        if matches!(to, EngagementState::Idle | EngagementState::Attacking) {
            clear_move_order(world, e.attacker, e.id, events);
        }
    }

    let Some((target, target_pos)) = e.target else {
        return;
    };
    if to == EngagementState::Idle {
        return;
    }

    if to == EngagementState::Pursuing {
        let order = MoveOrder {
            destination: target_pos,
            stop_distance: fsm::pursuit_stop_distance(
                e.attack_radius,
                config.engagement.pursuit_stop_fraction,
            ),
        };
        request_move(world, e.attacker, e.id, order, e.update.state_changed, events);
    }

    face_toward(world, e.attacker, &target_pos, config.engagement.turn_rate_rad_per_sec * dt);

    if to == EngagementState::Attacking && e.update.fire {
        fire_weapon(world, pools, config, e.attacker, target, events);
    }
}

/// Fire `attacker`'s weapon at `target` and restart its cooldown.
///
/// The cooldown restarts even when nothing could be launched, so a
/// misconfigured weapon does not retry every tick. Returns the number of
/// projectiles launched.
pub fn fire_weapon(
    world: &mut World,
    pools: &mut PoolManager,
    config: &CombatConfig,
    attacker: Entity,
    target: Entity,
    events: &mut Vec<CombatEvent>,
) -> usize {
    let launched = projectiles::fire(world, pools, attacker, target, &config.projectiles).len();

    let attacker_id = match world.get::<&Combatant>(attacker) {
        Ok(c) => c.id,
        Err(_) => return launched,
    };
    if let Ok(mut weapon) = world.get::<&mut Weapon>(attacker) {
        if weapon.cooldown_secs < config.engagement.min_cooldown_secs {
            tracing::warn!(
                combatant = attacker_id.0,
                cooldown = weapon.cooldown_secs,
                floor = config.engagement.min_cooldown_secs,
                "weapon cooldown below floor, clamped"
            );
        }
        weapon.cooldown_remaining_secs = weapon
            .cooldown_secs
            .max(config.engagement.min_cooldown_secs);
    }

    if launched > 0 {
        let target_id = world
            .get::<&Combatant>(target)
            .map(|c| c.id)
            .unwrap_or(CombatantId::NONE);
        tracing::debug!(attacker = attacker_id.0, target = target_id.0, launched, "fired");
        events.push(CombatEvent::AnimationTrigger {
            combatant: attacker_id,
            trigger: "Attack".to_string(),
        });
        events.push(CombatEvent::Fired {
            attacker: attacker_id,
            target: target_id,
            projectiles: launched as u32,
        });
    }
    launched
}

/// Synchronously stand an attacker down: clear its target and move order
/// and put it in Idle. Used for disable and death.
pub fn disengage(world: &mut World, attacker: Entity, events: &mut Vec<CombatEvent>) {
    let Ok(id) = world.get::<&Combatant>(attacker).map(|c| c.id) else {
        return;
    };
    clear_target(world, attacker, id, events);

    let from = match world.get::<&mut Engagement>(attacker) {
        Ok(mut engagement) => std::mem::replace(&mut engagement.state, EngagementState::Idle),
        Err(_) => EngagementState::Idle,
    };
    if from != EngagementState::Idle {
        tracing::debug!(combatant = id.0, from = ?from, "disengaged");
        events.push(CombatEvent::StateChanged {
            combatant: id,
            from,
            to: EngagementState::Idle,
        });
        clear_move_order(world, attacker, id, events);
    }
}

fn clear_target(world: &mut World, attacker: Entity, id: CombatantId, events: &mut Vec<CombatEvent>) {
    if let Ok(mut targeting) = world.get::<&mut Targeting>(attacker) {
        if targeting.current.take().is_some() {
            targeting.force_reselect = true;
            events.push(CombatEvent::TargetChanged {
                combatant: id,
                target: CombatantId::NONE,
            });
        }
    }
}

fn clear_move_order(world: &mut World, attacker: Entity, id: CombatantId, events: &mut Vec<CombatEvent>) {
    let _ = world.remove_one::<MoveOrder>(attacker);
    events.push(CombatEvent::MoveReset { combatant: id });
}

fn request_move(
    world: &mut World,
    attacker: Entity,
    id: CombatantId,
    order: MoveOrder,
    entered: bool,
    events: &mut Vec<CombatEvent>,
) {
    let stale = match world.get::<&MoveOrder>(attacker) {
        Ok(current) => {
            current.destination.range_to(&order.destination) > MOVE_ORDER_REFRESH_DISTANCE
                || current.stop_distance != order.stop_distance
        }
        Err(_) => true,
    };
    if !(stale || entered) {
        return;
    }
    let _ = world.insert_one(attacker, order);
    events.push(CombatEvent::MoveRequested {
        combatant: id,
        destination: order.destination,
        stop_distance: order.stop_distance,
    });
}

fn face_toward(world: &mut World, attacker: Entity, target: &Position, max_delta: f64) {
    let Ok(pos) = world.get::<&Position>(attacker).map(|p| *p) else {
        return;
    };
    if let Ok(mut facing) = world.get::<&mut Facing>(attacker) {
        let desired = (pos.bearing_to(target), pos.elevation_to(target));
        let (yaw, pitch) = fsm::turn_toward((facing.yaw, facing.pitch), desired, max_delta);
        facing.yaw = yaw;
        facing.pitch = pitch;
    }
}
