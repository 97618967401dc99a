//! Candidate tracker: maintains each attacker's set of hostile combatants
//! inside its detection volume.
//!
//! Entries arrive and leave through discrete enter/exit notifications. A
//! periodic cleanup pass catches the ones that died, switched sides or
//! drifted outside the scaled detection radius without an exit
//! notification.

use hecs::{Entity, World};

use skirmish_core::components::{Combatant, Scale, Sensors};
use skirmish_core::types::Position;

use crate::tracking::{is_valid_target, Candidates, Targeting};

/// `other` entered `observer`'s detection volume. Added only if alive and
/// hostile. Returns true if the candidate set changed.
pub fn on_enter(world: &mut World, observer: Entity, other: Entity) -> bool {
    if observer == other || !is_valid_target(world, other) {
        return false;
    }
    let hostile = match (
        world.get::<&Combatant>(observer),
        world.get::<&Combatant>(other),
    ) {
        (Ok(a), Ok(b)) => a.faction.is_hostile_to(b.faction),
        _ => false,
    };
    if !hostile {
        return false;
    }

    let inserted = match world.get::<&mut Candidates>(observer) {
        Ok(mut candidates) => candidates.insert(other),
        Err(_) => false,
    };
    if inserted {
        if let Ok(mut targeting) = world.get::<&mut Targeting>(observer) {
            targeting.force_reselect = true;
        }
    }
    inserted
}

/// `other` left `observer`'s detection volume. Removed unconditionally.
pub fn on_exit(world: &mut World, observer: Entity, other: Entity) -> bool {
    match world.get::<&mut Candidates>(observer) {
        Ok(mut candidates) => candidates.remove(other),
        Err(_) => false,
    }
}

/// Drop despawned, dead, allied and out-of-radius entries from every
/// candidate set. The radius is the detection radius times the attacker's
/// scale, with no lost-target buffer. Returns the number of entries removed.
pub fn cleanup(world: &mut World) -> usize {
    let mut removals: Vec<(Entity, Vec<Entity>)> = Vec::new();

    for (entity, (candidates, combatant, pos, sensors, scale)) in world
        .query::<(&Candidates, &Combatant, &Position, &Sensors, Option<&Scale>)>()
        .iter()
    {
        let scale = scale.copied().unwrap_or_default().0;
        let range = sensors.detection_radius * scale;
        let stale: Vec<Entity> = candidates
            .entries
            .iter()
            .copied()
            .filter(|&other| !still_candidate(world, combatant, pos, range, other))
            .collect();
        if !stale.is_empty() {
            removals.push((entity, stale));
        }
    }

    let mut removed = 0;
    for (entity, stale) in removals {
        if let Ok(mut candidates) = world.get::<&mut Candidates>(entity) {
            for other in stale {
                if candidates.remove(other) {
                    removed += 1;
                }
            }
        }
    }
    if removed > 0 {
        tracing::debug!(removed, "candidate cleanup");
    }
    removed
}

fn still_candidate(
    world: &World,
    observer: &Combatant,
    observer_pos: &Position,
    range: f64,
    other: Entity,
) -> bool {
    if !is_valid_target(world, other) {
        return false;
    }
    let hostile = world
        .get::<&Combatant>(other)
        .map(|c| observer.faction.is_hostile_to(c.faction))
        .unwrap_or(false);
    let in_range = world
        .get::<&Position>(other)
        .map(|p| observer_pos.range_to(&p) <= range)
        .unwrap_or(false);
    hostile && in_range
}
