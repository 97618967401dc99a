//! Projectile lifecycle: launch, per-tick flight, and impact.
//!
//! Projectiles live in the projectile pool, not in the ECS world. Each fixed
//! tick a live projectile:
//! 1. impacts with no target once its lifespan is exceeded,
//! 2. re-reads its bound target; a lost target leaves it flying to the last
//!    known position, and after the orphan timeout it impacts with no target,
//! 3. advances along its trajectory,
//! 4. impacts on collision with its target or any hostile combatant, or on
//!    reaching its destination.
//!
//! `impact` runs at most once per acquisition (the `impacted` flag) and
//! releases the projectile back to its pool exactly once.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;

use skirmish_core::components::{
    Body, Combatant, CombatantId, Facing, Faction, Scale, Status, Weapon,
};
use skirmish_core::config::{CombatConfig, ProjectileConfig};
use skirmish_core::constants::DEFAULT_BODY_RADIUS;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::Position;
use skirmish_rules::damage::{falloff_multiplier, DamageInput};
use skirmish_rules::trajectory::{self, TrajectoryParams};

use crate::pool::PoolHandle;
use crate::projectile::{PoolManager, Projectile};
use crate::systems::{damage, effects};
use crate::tracking::is_valid_target;

/// Launch one projectile per cannon point of `attacker`'s weapon at `target`.
///
/// Returns the launched handles. An empty cannon list, a missing weapon or
/// an unavailable pool instance skip silently (logged at debug).
pub fn fire(
    world: &World,
    pools: &mut PoolManager,
    attacker: Entity,
    target: Entity,
    config: &ProjectileConfig,
) -> Vec<PoolHandle> {
    let Some(launch) = read_launch(world, attacker, target) else {
        return Vec::new();
    };
    if launch.weapon.cannon_points.is_empty() {
        tracing::debug!(attacker = launch.owner.id.0, "no cannon points, shot skipped");
        return Vec::new();
    }

    let (forward, right) = heading_axes(launch.facing.yaw);
    let mut launched = Vec::with_capacity(launch.weapon.cannon_points.len());
    for cannon in &launch.weapon.cannon_points {
        let offset = (right * cannon.x + forward * cannon.y + DVec3::Z * cannon.z) * launch.scale;
        let muzzle = Position::from(launch.origin.as_dvec3() + offset);

        let handle = match pools.projectiles.acquire(launch.weapon.projectile) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::debug!(error = %err, "projectile skipped");
                continue;
            }
        };
        let Some(p) = pools.projectiles.get_mut(handle) else {
            continue;
        };
        let weapon = &launch.weapon;
        p.owner = Some(attacker);
        p.owner_id = launch.owner.id;
        p.faction = launch.owner.faction;
        p.speed = weapon.projectile_speed.max(0.0);
        p.base_damage = weapon.damage;
        p.damage_type = weapon.damage_type;
        p.crit_chance = weapon.crit_chance;
        p.crit_multiplier = weapon.crit_multiplier;
        p.trajectory = weapon.trajectory;
        p.target = Some(target);
        p.target_id = launch.target_id;
        p.last_known_target = launch.target_pos;
        p.lost_target_secs = None;
        p.origin = muzzle;
        p.base = muzzle;
        p.position = muzzle;
        p.travelled = 0.0;
        p.time_alive_secs = 0.0;
        p.max_lifespan_secs = weapon.max_lifespan_secs;
        if p.radius <= 0.0 {
            p.radius = config.radius;
        }
        p.aoe_radius = weapon.aoe_radius.filter(|r| *r > 0.0);
        p.knockback = weapon.knockback;
        p.impact_effect = weapon.impact_effect;
        p.impacted = false;
        launched.push(handle);
    }
    launched
}

struct Launch {
    owner: Combatant,
    origin: Position,
    facing: Facing,
    scale: f64,
    weapon: Weapon,
    target_id: CombatantId,
    target_pos: Position,
}

fn read_launch(world: &World, attacker: Entity, target: Entity) -> Option<Launch> {
    let owner = *world.get::<&Combatant>(attacker).ok()?;
    let origin = *world.get::<&Position>(attacker).ok()?;
    let facing = world
        .get::<&Facing>(attacker)
        .map(|f| *f)
        .unwrap_or_default();
    let scale = world
        .get::<&Scale>(attacker)
        .map(|s| s.0)
        .unwrap_or(1.0);
    let weapon = world.get::<&Weapon>(attacker).ok().map(|w| (*w).clone())?;
    let target_id = world.get::<&Combatant>(target).ok()?.id;
    let target_pos = *world.get::<&Position>(target).ok()?;
    Some(Launch {
        owner,
        origin,
        facing,
        scale,
        weapon,
        target_id,
        target_pos,
    })
}

/// Forward and right unit vectors for a bearing (0 = North, clockwise).
fn heading_axes(yaw: f64) -> (DVec3, DVec3) {
    let (sin, cos) = yaw.sin_cos();
    (DVec3::new(sin, cos, 0.0), DVec3::new(cos, -sin, 0.0))
}

enum Flight {
    Continue,
    Impact(Option<Entity>),
}

/// Advance every live projectile by one fixed tick.
#[allow(clippy::too_many_arguments)]
pub fn run<R: Rng + ?Sized>(
    world: &mut World,
    pools: &mut PoolManager,
    rng: &mut R,
    config: &CombatConfig,
    dt: f64,
    now_secs: f64,
    events: &mut Vec<CombatEvent>,
) {
    let params = TrajectoryParams {
        amplitude: config.projectiles.amplitude,
        frequency_hz: config.projectiles.frequency_hz,
        blend_distance: config.projectiles.blend_distance,
    };

    for handle in pools.projectiles.in_use_handles() {
        let flight = match pools.projectiles.get_mut(handle) {
            Some(p) => step(world, p, dt, &params, &config.projectiles),
            None => continue,
        };
        if let Flight::Impact(hit) = flight {
            impact(world, pools, rng, handle, hit, config, now_secs, events);
        }
    }
}

fn step(
    world: &World,
    p: &mut Projectile,
    dt: f64,
    params: &TrajectoryParams,
    config: &ProjectileConfig,
) -> Flight {
    p.time_alive_secs += dt;
    if p.time_alive_secs > p.max_lifespan_secs + 1e-9 {
        return Flight::Impact(None);
    }

    match p.target {
        Some(target) if is_valid_target(world, target) => {
            if let Ok(pos) = world.get::<&Position>(target) {
                p.last_known_target = *pos;
            }
        }
        Some(_) => {
            tracing::trace!(owner = p.owner_id.0, target = p.target_id.0, "projectile lost its target");
            p.target = None;
            p.lost_target_secs = Some(0.0);
        }
        None => {
            if let Some(lost) = p.lost_target_secs.as_mut() {
                *lost += dt;
            }
        }
    }
    if p.lost_target_secs.is_some_and(|lost| lost >= config.orphan_timeout_secs) {
        return Flight::Impact(None);
    }

    let next = trajectory::advance(
        p.trajectory,
        p.base.as_dvec3(),
        p.last_known_target.as_dvec3(),
        p.speed,
        dt,
        p.time_alive_secs,
        p.travelled,
        params,
        config.arrival_epsilon,
    );
    p.base = Position::from(next.base);
    p.position = Position::from(next.position);
    p.travelled += next.travelled;

    if let Some(hit) = collide(world, p) {
        return Flight::Impact(Some(hit));
    }
    if next.arrived {
        return Flight::Impact(None);
    }
    Flight::Continue
}

/// Bound target first, then the nearest hostile combatant in reach.
fn collide(world: &World, p: &Projectile) -> Option<Entity> {
    if let Some(target) = p.target {
        if let Some(reach) = reach_of(world, target, p.radius) {
            if let Ok(pos) = world.get::<&Position>(target) {
                if p.position.range_to(&pos) <= reach {
                    return Some(target);
                }
            }
        }
    }

    let mut best: Option<(f64, CombatantId, Entity)> = None;
    for (entity, (combatant, pos, status, body, scale)) in world
        .query::<(&Combatant, &Position, &Status, Option<&Body>, Option<&Scale>)>()
        .iter()
    {
        if !status.alive || !p.faction.is_hostile_to(combatant.faction) {
            continue;
        }
        let reach = body.map_or(DEFAULT_BODY_RADIUS, |b| b.radius)
            * scale.map_or(1.0, |s| s.0)
            + p.radius;
        let d = p.position.range_to(pos);
        if d > reach {
            continue;
        }
        let closer = match best {
            Some((best_d, best_id, _)) => d < best_d || (d == best_d && combatant.id < best_id),
            None => true,
        };
        if closer {
            best = Some((d, combatant.id, entity));
        }
    }
    best.map(|(_, _, entity)| entity)
}

fn reach_of(world: &World, entity: Entity, projectile_radius: f64) -> Option<f64> {
    let body = world
        .get::<&Body>(entity)
        .map(|b| b.radius)
        .unwrap_or(DEFAULT_BODY_RADIUS);
    let scale = world.get::<&Scale>(entity).map(|s| s.0).unwrap_or(1.0);
    world
        .contains(entity)
        .then_some(body * scale + projectile_radius)
}

/// Resolve a projectile's impact and release it. Returns false if the
/// handle is stale or the projectile already impacted.
#[allow(clippy::too_many_arguments)]
pub fn impact<R: Rng + ?Sized>(
    world: &mut World,
    pools: &mut PoolManager,
    rng: &mut R,
    handle: PoolHandle,
    hit: Option<Entity>,
    config: &CombatConfig,
    now_secs: f64,
    events: &mut Vec<CombatEvent>,
) -> bool {
    let p = match pools.projectiles.get_mut(handle) {
        Some(p) if !p.impacted => {
            p.impacted = true;
            p.clone()
        }
        _ => return false,
    };

    let input = DamageInput {
        base_damage: p.base_damage,
        damage_type: p.damage_type,
        crit_chance: p.crit_chance,
        crit_multiplier: p.crit_multiplier,
        falloff: 1.0,
    };
    let knockback = (p.knockback > 0.0).then_some(damage::KnockbackSource {
        origin: p.position.as_dvec3(),
        strength: p.knockback,
    });

    if let Some(target) = hit {
        damage::apply_hit(world, rng, target, &input, knockback, now_secs, events);
    }

    if let Some(radius) = p.aoe_radius {
        for (victim, distance) in area_victims(world, p.faction, &p.position, radius, hit) {
            let splash = DamageInput {
                falloff: falloff_multiplier(distance, radius),
                ..input
            };
            damage::apply_hit(world, rng, victim, &splash, knockback, now_secs, events);
        }
        if let Some(prefab) = config.effects.explosion_prefab {
            effects::play_explosion(pools, prefab, p.position, radius, events);
        }
    }

    if let Some(prefab) = p.impact_effect {
        let yaw = p.origin.bearing_to(&p.position);
        let pitch = p.origin.elevation_to(&p.position);
        effects::play_impact(pools, prefab, p.position, yaw, pitch, events);
    }

    tracing::trace!(
        owner = p.owner_id.0,
        hit = hit.is_some(),
        alive_secs = p.time_alive_secs,
        "projectile impact"
    );
    pools.projectiles.release(handle).is_ok()
}

/// Hostile, live combatants strictly inside `radius`, excluding the direct
/// hit, ordered by id.
fn area_victims(
    world: &World,
    faction: Faction,
    center: &Position,
    radius: f64,
    exclude: Option<Entity>,
) -> Vec<(Entity, f64)> {
    let mut victims: Vec<(CombatantId, Entity, f64)> = world
        .query::<(&Combatant, &Position, &Status)>()
        .iter()
        .filter(|(entity, (combatant, _, status))| {
            status.alive && Some(*entity) != exclude && faction.is_hostile_to(combatant.faction)
        })
        .map(|(entity, (combatant, pos, _))| (combatant.id, entity, center.range_to(pos)))
        .filter(|(_, _, distance)| *distance < radius)
        .collect();
    victims.sort_by_key(|(id, _, _)| *id);
    victims
        .into_iter()
        .map(|(_, entity, distance)| (entity, distance))
        .collect()
}
