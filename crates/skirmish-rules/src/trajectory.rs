//! Projectile trajectory formulas.
//!
//! A projectile keeps an unperturbed "base" point that flies straight at the
//! destination; the visible position is the base plus a lateral offset that
//! is a pure function of elapsed time. The offset envelope is zero at launch
//! and at arrival, so every kind converges on the destination and replays
//! are reproducible.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use skirmish_core::enums::TrajectoryKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryParams {
    /// Peak lateral offset (meters).
    pub amplitude: f64,
    pub frequency_hz: f64,
    /// Distance over which the offset fades in after launch and out before arrival.
    pub blend_distance: f64,
}

/// Result of advancing one projectile by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub base: DVec3,
    pub position: DVec3,
    /// Meters the base moved this tick.
    pub travelled: f64,
    pub arrived: bool,
}

/// Advance a projectile's base toward `destination` and compute its position.
///
/// `time_alive_secs` is the elapsed time after this tick; `travelled` is the
/// distance covered before this tick.
#[allow(clippy::too_many_arguments)]
pub fn advance(
    kind: TrajectoryKind,
    base: DVec3,
    destination: DVec3,
    speed: f64,
    dt: f64,
    time_alive_secs: f64,
    travelled: f64,
    params: &TrajectoryParams,
    arrival_epsilon: f64,
) -> Step {
    let to_destination = destination - base;
    let remaining = to_destination.length();
    let step = (speed * dt).max(0.0);

    if remaining <= step.max(arrival_epsilon) {
        return Step {
            base: destination,
            position: destination,
            travelled: remaining,
            arrived: true,
        };
    }

    let forward = to_destination / remaining;
    let new_base = base + forward * step;
    let offset = lateral_offset(
        kind,
        forward,
        time_alive_secs,
        travelled + step,
        remaining - step,
        params,
    );

    Step {
        base: new_base,
        position: new_base + offset,
        travelled: step,
        arrived: false,
    }
}

/// Lateral offset from the base point for a trajectory kind.
pub fn lateral_offset(
    kind: TrajectoryKind,
    forward: DVec3,
    time_alive_secs: f64,
    travelled: f64,
    remaining: f64,
    params: &TrajectoryParams,
) -> DVec3 {
    let envelope = envelope(travelled, remaining, params.blend_distance);
    if envelope <= 0.0 || params.amplitude == 0.0 {
        return DVec3::ZERO;
    }

    let (right, up) = lateral_basis(forward);
    let amplitude = params.amplitude * envelope;
    let phase = TAU * params.frequency_hz * time_alive_secs;

    match kind {
        TrajectoryKind::Straight => DVec3::ZERO,
        TrajectoryKind::Wavering => right * amplitude * phase.sin(),
        TrajectoryKind::Zigzag => right * amplitude * triangle(phase),
        TrajectoryKind::Circular => (right * phase.cos() + up * phase.sin()) * amplitude,
    }
}

/// Unit vectors perpendicular to `forward`: horizontal right and its up.
pub fn lateral_basis(forward: DVec3) -> (DVec3, DVec3) {
    let right = forward
        .cross(DVec3::Z)
        .try_normalize()
        .unwrap_or(DVec3::X);
    let up = right.cross(forward).try_normalize().unwrap_or(DVec3::Z);
    (right, up)
}

fn envelope(travelled: f64, remaining: f64, blend_distance: f64) -> f64 {
    if blend_distance <= 0.0 {
        return 1.0;
    }
    (travelled.min(remaining) / blend_distance).clamp(0.0, 1.0)
}

/// Triangle wave with the same period and phase as `sin`, in [-1, 1].
fn triangle(phase: f64) -> f64 {
    (2.0 / PI) * phase.sin().asin()
}
