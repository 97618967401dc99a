//! Engagement finite state machine.
//!
//! Pure functions that compute the Idle / Pursuing / Attacking transition for
//! one attacker from its current situation. No ECS dependency; the sim crate
//! gathers an `EngagementContext` per attacker and applies the update.

use std::f64::consts::{PI, TAU};

use skirmish_core::enums::EngagementState;

/// Input to the engagement FSM for a single attacker.
#[derive(Debug, Clone, Copy)]
pub struct EngagementContext {
    pub state: EngagementState,
    /// Dead, stunned, or voluntarily disabled.
    pub disabled: bool,
    /// Distance to the selected target, if one is selected and alive.
    pub target_distance: Option<f64>,
    /// Attack radius multiplied by the attacker's current scale.
    pub attack_radius: f64,
    /// Detection radius multiplied by the attacker's current scale.
    pub detection_radius: f64,
    /// Fraction of the detection radius tolerated before the target is lost.
    pub lost_target_tolerance: f64,
    pub weapon_ready: bool,
}

/// Output from the engagement FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementUpdate {
    pub new_state: EngagementState,
    pub state_changed: bool,
    /// The current target must be dropped.
    pub drop_target: bool,
    /// Fire this tick.
    pub fire: bool,
}

/// Evaluate the FSM for one attacker.
pub fn evaluate(ctx: &EngagementContext) -> EngagementUpdate {
    if ctx.disabled {
        return transition(ctx, EngagementState::Idle, true, false);
    }

    let distance = match ctx.target_distance {
        Some(d) => d,
        None => return transition(ctx, EngagementState::Idle, false, false),
    };

    if distance > lost_target_range(ctx.detection_radius, ctx.lost_target_tolerance) {
        return transition(ctx, EngagementState::Idle, true, false);
    }

    if distance <= ctx.attack_radius {
        return transition(ctx, EngagementState::Attacking, false, ctx.weapon_ready);
    }

    transition(ctx, EngagementState::Pursuing, false, false)
}

fn transition(
    ctx: &EngagementContext,
    new_state: EngagementState,
    drop_target: bool,
    fire: bool,
) -> EngagementUpdate {
    EngagementUpdate {
        new_state,
        state_changed: new_state != ctx.state,
        drop_target,
        fire,
    }
}

/// Range beyond which a tracked target counts as lost.
pub fn lost_target_range(detection_radius: f64, tolerance: f64) -> f64 {
    detection_radius * (1.0 + tolerance.max(0.0))
}

/// Distance at which pursuit stops short of the target.
pub fn pursuit_stop_distance(attack_radius: f64, stop_fraction: f64) -> f64 {
    attack_radius * stop_fraction
}

/// Turn a (yaw, pitch) facing toward a desired one by at most `max_delta`
/// radians per axis. Yaw wraps through the shortest direction.
pub fn turn_toward(current: (f64, f64), desired: (f64, f64), max_delta: f64) -> (f64, f64) {
    let max_delta = max_delta.max(0.0);
    let yaw_error = wrap_pi(desired.0 - current.0);
    let yaw = (current.0 + yaw_error.clamp(-max_delta, max_delta)).rem_euclid(TAU);
    let pitch_error = desired.1 - current.1;
    let pitch = current.1 + pitch_error.clamp(-max_delta, max_delta);
    (yaw, pitch)
}

/// Wrap an angle into (-PI, PI].
fn wrap_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
