//! Kinematic integration on the fixed tick.
//!
//! Combatants with `Mobility` walk toward their `MoveOrder` destination and
//! stop at its stop distance. Knockback velocity is integrated for anything
//! carrying `Knockback` and decays exponentially until it is dropped.

use hecs::{Entity, World};

use skirmish_core::components::{Knockback, Mobility, MoveOrder, Status};
use skirmish_core::config::DamageConfig;
use skirmish_core::types::{Position, Velocity};

/// Move combatants along their move orders.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (pos, mobility, order, status)) in
        world.query_mut::<(&mut Position, &Mobility, &MoveOrder, &Status)>()
    {
        if !status.alive || status.disabled {
            continue;
        }
        let remaining = pos.range_to(&order.destination) - order.stop_distance;
        if remaining <= 0.0 {
            continue;
        }
        let step = (mobility.speed * dt).min(remaining);
        *pos = pos.step_toward(&order.destination, step);
    }
}

/// Integrate and decay knockback velocity.
pub fn apply_knockback(world: &mut World, dt: f64, config: &DamageConfig) {
    let decay = (1.0 - config.knockback_decay_per_sec * dt).max(0.0);
    let mut settled: Vec<Entity> = Vec::new();

    for (entity, (pos, knockback)) in world.query_mut::<(&mut Position, &mut Knockback)>() {
        let v = knockback.velocity.as_dvec3();
        *pos = Position::from(pos.as_dvec3() + v * dt);
        let next = v * decay;
        if next.length() < config.knockback_min_speed {
            settled.push(entity);
        } else {
            knockback.velocity = Velocity::from(next);
        }
    }

    for entity in settled {
        let _ = world.remove_one::<Knockback>(entity);
    }
}
