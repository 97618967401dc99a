//! Effect playback backed by the effect pool.
//!
//! Playing acquires an `Effect`, stamps it with its placement and emits the
//! matching event for the presentation collaborator. Each fixed tick ages
//! live effects and releases the expired ones.

use skirmish_core::components::PrototypeId;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::Position;

use crate::projectile::PoolManager;

/// Play an impact effect. Returns false if the pool could not supply one.
pub fn play_impact(
    pools: &mut PoolManager,
    prefab: PrototypeId,
    position: Position,
    yaw: f64,
    pitch: f64,
    events: &mut Vec<CombatEvent>,
) -> bool {
    if !spawn(pools, prefab, position, yaw, pitch, 1.0) {
        return false;
    }
    events.push(CombatEvent::ImpactPlayed {
        prefab,
        position,
        yaw,
        pitch,
    });
    true
}

/// Play an explosion scaled to the blast radius.
pub fn play_explosion(
    pools: &mut PoolManager,
    prefab: PrototypeId,
    position: Position,
    scale: f64,
    events: &mut Vec<CombatEvent>,
) -> bool {
    if !spawn(pools, prefab, position, 0.0, 0.0, scale) {
        return false;
    }
    events.push(CombatEvent::ExplosionPlayed {
        prefab,
        position,
        scale,
    });
    true
}

fn spawn(
    pools: &mut PoolManager,
    prefab: PrototypeId,
    position: Position,
    yaw: f64,
    pitch: f64,
    scale: f64,
) -> bool {
    let handle = match pools.effects.acquire(prefab) {
        Ok(handle) => handle,
        Err(err) => {
            tracing::debug!(error = %err, "effect skipped");
            return false;
        }
    };
    let Some(effect) = pools.effects.get_mut(handle) else {
        return false;
    };
    effect.position = position;
    effect.yaw = yaw;
    effect.pitch = pitch;
    effect.scale = scale;
    effect.remaining_secs = effect.lifetime_secs;
    true
}

/// Age live effects and release the expired ones. Returns how many expired.
pub fn run(pools: &mut PoolManager, dt: f64) -> usize {
    let mut expired = Vec::new();
    for handle in pools.effects.in_use_handles() {
        if let Some(effect) = pools.effects.get_mut(handle) {
            effect.remaining_secs -= dt;
            if effect.remaining_secs <= 0.0 {
                expired.push(handle);
            }
        }
    }
    let count = expired.len();
    for handle in expired {
        let _ = pools.effects.release(handle);
    }
    count
}
