//! Snapshot system: queries the world and pools and builds a `CombatSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::events::CombatEvent;
use skirmish_core::state::*;
use skirmish_core::types::{Position, SimTime};

use crate::projectile::PoolManager;
use crate::tracking::{is_valid_target, Engagement, Targeting};

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    pools: &PoolManager,
    events: Vec<CombatEvent>,
) -> CombatSnapshot {
    CombatSnapshot {
        time: *time,
        combatants: build_combatants(world),
        projectiles: build_projectiles(pools),
        pools: build_pools(pools),
        events,
    }
}

/// Combatants ordered by id.
fn build_combatants(world: &World) -> Vec<CombatantView> {
    let mut views: Vec<CombatantView> = world
        .query::<(
            &Combatant,
            &Position,
            Option<&Facing>,
            &Health,
            Option<&Shield>,
            &Status,
            Option<&Engagement>,
            Option<&Targeting>,
        )>()
        .iter()
        .map(
            |(_entity, (combatant, pos, facing, health, shield, status, engagement, targeting))| {
                let target = targeting
                    .and_then(|t| t.current)
                    .filter(|t| is_valid_target(world, *t))
                    .and_then(|t| world.get::<&Combatant>(t).ok().map(|c| c.id))
                    .unwrap_or(CombatantId::NONE);
                CombatantView {
                    id: combatant.id,
                    faction: combatant.faction,
                    position: *pos,
                    yaw: facing.map_or(0.0, |f| f.yaw),
                    health: health.current,
                    max_health: health.max,
                    shield: shield.map_or(0.0, Shield::display),
                    alive: status.alive,
                    state: engagement.map(|e| e.state).unwrap_or_default(),
                    target,
                }
            },
        )
        .collect();
    views.sort_by_key(|v| v.id);
    views
}

fn build_projectiles(pools: &PoolManager) -> Vec<ProjectileView> {
    pools
        .projectiles
        .in_use_handles()
        .into_iter()
        .filter_map(|handle| pools.projectiles.get(handle))
        .map(|p| ProjectileView {
            position: p.position,
            trajectory: p.trajectory,
            target: if p.target.is_some() {
                p.target_id
            } else {
                CombatantId::NONE
            },
            time_alive_secs: p.time_alive_secs,
        })
        .collect()
}

fn build_pools(pools: &PoolManager) -> PoolView {
    PoolView {
        projectiles_in_use: pools.projectiles.in_use_count(),
        projectiles_free: pools.projectiles.free_count(),
        effects_in_use: pools.effects.in_use_count(),
        effects_free: pools.effects.free_count(),
        misuse_count: pools.misuse_count(),
    }
}
