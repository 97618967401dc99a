//! Damage resolution pipeline.
//!
//! Pure functions: the caller supplies the defender's current values and an
//! RNG, and gets back the values to write. Nothing here touches the ECS.
//!
//! Order is fixed: falloff, crit roll, dodge roll, shield/health routing.
//! Both rolls are always drawn so the RNG stream does not depend on the
//! outcome of earlier steps.

use glam::DVec3;
use rand::Rng;

use skirmish_core::enums::{DamageRoute, DamageType};

/// Attacker-side inputs for one hit.
#[derive(Debug, Clone, Copy)]
pub struct DamageInput {
    pub base_damage: f64,
    pub damage_type: DamageType,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    /// Distance falloff multiplier, 1.0 for direct hits.
    pub falloff: f64,
}

impl DamageInput {
    /// A flat hit with no crit chance and no falloff.
    pub fn flat(base_damage: f64, damage_type: DamageType) -> Self {
        Self {
            base_damage,
            damage_type,
            crit_chance: 0.0,
            crit_multiplier: 1.0,
            falloff: 1.0,
        }
    }
}

/// Defender-side values read before the hit.
#[derive(Debug, Clone, Copy)]
pub struct DefenderState {
    pub health: f64,
    pub shield: f64,
    pub dodge_chance: f64,
}

/// Result of one resolved hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedDamage {
    /// Damage after falloff and crit; 0 when dodged.
    pub amount: f64,
    pub critical: bool,
    pub route: DamageRoute,
    pub shield_after: f64,
    pub health_after: f64,
    /// True when this hit took health from positive to zero.
    pub killed: bool,
}

impl AppliedDamage {
    pub fn dodged(&self) -> bool {
        self.route == DamageRoute::Dodged
    }
}

/// Resolve one hit against a defender.
///
/// The shield absorbs the whole hit when it has any points left; damage in
/// excess of the remaining shield is lost rather than carried into health.
pub fn resolve<R: Rng + ?Sized>(
    input: &DamageInput,
    defender: &DefenderState,
    rng: &mut R,
) -> AppliedDamage {
    let mut amount = (input.base_damage * input.falloff).max(0.0);

    let crit_roll: f64 = rng.gen();
    let critical = crit_roll < input.crit_chance;
    if critical {
        amount *= input.crit_multiplier.max(0.0);
    }

    let dodge_roll: f64 = rng.gen();
    if dodge_roll < defender.dodge_chance {
        return AppliedDamage {
            amount: 0.0,
            critical,
            route: DamageRoute::Dodged,
            shield_after: defender.shield,
            health_after: defender.health,
            killed: false,
        };
    }

    if defender.shield > 0.0 && !input.damage_type.bypasses_shield() {
        return AppliedDamage {
            amount,
            critical,
            route: DamageRoute::Shield,
            shield_after: (defender.shield - amount).max(0.0),
            health_after: defender.health,
            killed: false,
        };
    }

    let health_after = (defender.health - amount).max(0.0);
    AppliedDamage {
        amount,
        critical,
        route: DamageRoute::Health,
        shield_after: defender.shield,
        health_after,
        killed: defender.health > 0.0 && health_after <= 0.0,
    }
}

/// Area-effect falloff: 1 at the center, 0 at (and beyond) the radius.
pub fn falloff_multiplier(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return if distance <= 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - (distance / radius).clamp(0.0, 1.0)
}

/// Knockback impulse pushing `defender` away from `source`.
///
/// Magnitude is `strength / (1 + distance)`: strongest at the source.
/// A defender exactly on the source is pushed straight up.
pub fn knockback_impulse(strength: f64, source: DVec3, defender: DVec3) -> DVec3 {
    if strength <= 0.0 {
        return DVec3::ZERO;
    }
    let offset = defender - source;
    let distance = offset.length();
    let direction = offset.try_normalize().unwrap_or(DVec3::Z);
    direction * (strength / (1.0 + distance))
}
