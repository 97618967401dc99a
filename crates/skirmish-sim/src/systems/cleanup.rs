//! Cleanup system: despawns dead combatants once their corpse has lingered.

use hecs::{Entity, World};

use skirmish_core::components::{Combatant, CombatantId, Status};

/// Despawn combatants that died at least `linger_secs` ago. Returns their ids
/// so the engine can drop them from its id map.
pub fn run(
    world: &mut World,
    now_secs: f64,
    linger_secs: f64,
    despawn_buffer: &mut Vec<(Entity, CombatantId)>,
) -> Vec<CombatantId> {
    despawn_buffer.clear();

    for (entity, (combatant, status)) in world.query_mut::<(&Combatant, &Status)>() {
        if status.alive {
            continue;
        }
        if let Some(died_at) = status.died_at_secs {
            if now_secs - died_at >= linger_secs {
                despawn_buffer.push((entity, combatant.id));
            }
        }
    }

    let mut removed = Vec::with_capacity(despawn_buffer.len());
    for (entity, id) in despawn_buffer.drain(..) {
        if world.despawn(entity).is_ok() {
            tracing::debug!(combatant = id.0, "corpse despawned");
            removed.push(id);
        }
    }
    removed
}
