//! Built-in broadphase sensor.
//!
//! Stands in for an external spatial collaborator: buckets every live
//! combatant into a spatial hash, finds who is inside each observer's scaled
//! detection radius, and diffs that against the previous sweep to produce
//! enter/exit notifications for the candidate tracker.

use std::collections::{BTreeSet, HashMap};

use hecs::{Entity, World};

use skirmish_core::components::{Combatant, CombatantId, Scale, Sensors, Status};
use skirmish_core::types::Position;

use crate::spatial::SpatialHash;
use crate::systems::candidates;
use crate::tracking::SensorMemory;

/// Sweep once. Returns (enters, exits) delivered.
pub fn run(world: &mut World, ids: &HashMap<CombatantId, Entity>, cell_size: f64) -> (usize, usize) {
    let hash = SpatialHash::build(
        cell_size,
        world
            .query::<(&Combatant, &Position, &Status)>()
            .iter()
            .filter(|(_, (_, _, status))| status.alive)
            .map(|(_, (combatant, pos, _))| (combatant.id, *pos)),
    );

    // Read: who is inside each observer's volume now.
    let mut diffs: Vec<(Entity, Vec<CombatantId>, Vec<CombatantId>, BTreeSet<CombatantId>)> =
        Vec::new();
    for (entity, (combatant, pos, sensors, scale, memory)) in world
        .query::<(&Combatant, &Position, &Sensors, Option<&Scale>, &SensorMemory)>()
        .iter()
    {
        let scale = scale.copied().unwrap_or_default().0;
        let inside: BTreeSet<CombatantId> = hash
            .query_sphere(pos, sensors.detection_radius * scale)
            .into_iter()
            .filter(|id| *id != combatant.id)
            .collect();
        let entered: Vec<CombatantId> = inside.difference(&memory.inside).copied().collect();
        let exited: Vec<CombatantId> = memory.inside.difference(&inside).copied().collect();
        if !entered.is_empty() || !exited.is_empty() {
            diffs.push((entity, entered, exited, inside));
        }
    }

    // Write: deliver notifications and remember the new sets.
    let mut enters = 0;
    let mut exits = 0;
    for (observer, entered, exited, inside) in diffs {
        for id in exited {
            if let Some(&other) = ids.get(&id) {
                if candidates::on_exit(world, observer, other) {
                    exits += 1;
                }
            }
        }
        for id in entered {
            if let Some(&other) = ids.get(&id) {
                if candidates::on_enter(world, observer, other) {
                    enters += 1;
                }
            }
        }
        if let Ok(mut memory) = world.get::<&mut SensorMemory>(observer) {
            memory.inside = inside;
        }
    }
    (enters, exits)
}
