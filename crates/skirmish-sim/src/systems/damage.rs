//! Applies resolved damage to defenders.
//!
//! The only place health and shield are mutated. Projectile impacts, area
//! damage and `CombatEngine::apply_damage` all route through `apply_hit`.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;

use skirmish_core::components::{
    Combatant, Defense, Health, Knockback, Physical, Shield, Status,
};
use skirmish_core::events::CombatEvent;
use skirmish_core::types::{Position, Velocity};
use skirmish_rules::damage::{self, AppliedDamage, DamageInput, DefenderState};

/// Where a knockback impulse comes from and how hard it pushes.
#[derive(Debug, Clone, Copy)]
pub struct KnockbackSource {
    pub origin: DVec3,
    pub strength: f64,
}

/// Resolve one hit against `defender` and write the result.
///
/// Returns `None` when the defender is gone or already dead.
pub fn apply_hit<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    defender: Entity,
    input: &DamageInput,
    knockback: Option<KnockbackSource>,
    now_secs: f64,
    events: &mut Vec<CombatEvent>,
) -> Option<AppliedDamage> {
    let (result, defender_id, impulse) = {
        let (combatant, health, shield, defense, status, pos, physical) = world
            .query_one_mut::<(
                &Combatant,
                &mut Health,
                Option<&mut Shield>,
                Option<&Defense>,
                &mut Status,
                &Position,
                Option<&Physical>,
            )>(defender)
            .ok()?;
        if !status.alive {
            return None;
        }

        let state = DefenderState {
            health: health.current,
            shield: shield.as_ref().map_or(0.0, |s| s.points),
            dodge_chance: defense.map_or(0.0, |d| d.dodge_chance),
        };
        let result = damage::resolve(input, &state, rng);

        health.current = result.health_after;
        if let Some(shield) = shield {
            shield.points = result.shield_after;
        }
        if result.killed {
            status.alive = false;
            status.died_at_secs = Some(now_secs);
        }

        let impulse = match (knockback, physical) {
            (Some(source), Some(physical)) if !result.dodged() => {
                let push = damage::knockback_impulse(source.strength, source.origin, pos.as_dvec3());
                Some(push / physical.mass.max(1e-3))
            }
            _ => None,
        };
        (result, combatant.id, impulse)
    };

    if result.dodged() {
        events.push(CombatEvent::Dodged {
            defender: defender_id,
        });
        return Some(result);
    }

    events.push(CombatEvent::Damaged {
        defender: defender_id,
        amount: result.amount,
        damage_type: input.damage_type,
        critical: result.critical,
        route: result.route,
    });
    if result.killed {
        tracing::debug!(defender = defender_id.0, "combatant killed");
        events.push(CombatEvent::Killed {
            defender: defender_id,
        });
    }

    if let Some(delta_v) = impulse.filter(|v| *v != DVec3::ZERO) {
        add_knockback(world, defender, delta_v);
    }

    Some(result)
}

fn add_knockback(world: &mut World, entity: Entity, delta_v: DVec3) {
    if let Ok(mut knockback) = world.get::<&mut Knockback>(entity) {
        knockback.velocity = Velocity::from(knockback.velocity.as_dvec3() + delta_v);
        return;
    }
    let _ = world.insert_one(
        entity,
        Knockback {
            velocity: Velocity::from(delta_v),
        },
    );
}
