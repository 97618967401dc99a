//! Components that hold entity references.
//!
//! These live in the sim crate rather than `skirmish-core` because they name
//! `hecs::Entity`. Every stored entity is a weak reference: it may point at a
//! despawned or dead combatant and must be checked with `is_valid_target`
//! before use.

use std::collections::BTreeSet;

use hecs::{Entity, World};

use skirmish_core::components::{CombatantId, Status};
use skirmish_core::enums::{EngagementState, TargetPolicy};

/// Hostile combatants currently inside this combatant's detection volume.
/// Insertion order is kept so selection ties resolve the same way every run.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub entries: Vec<Entity>,
}

impl Candidates {
    /// Returns false if already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.entries.contains(&entity) {
            return false;
        }
        self.entries.push(entity);
        true
    }

    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| *e != entity);
        self.entries.len() != before
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Target selection state for an attacker.
#[derive(Debug, Clone)]
pub struct Targeting {
    pub policy: TargetPolicy,
    pub current: Option<Entity>,
    /// Counts down to the next periodic re-selection.
    pub reselect_timer_secs: f64,
    /// Re-select on the next frame regardless of the timer.
    pub force_reselect: bool,
}

impl Targeting {
    pub fn new(policy: TargetPolicy) -> Self {
        Self {
            policy,
            current: None,
            reselect_timer_secs: 0.0,
            force_reselect: true,
        }
    }
}

/// Engagement state of an attacker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engagement {
    pub state: EngagementState,
}

/// Who the built-in broadphase last saw inside this combatant's detection
/// volume. Every armed combatant carries one; it stays empty unless the
/// broadphase is enabled.
#[derive(Debug, Clone, Default)]
pub struct SensorMemory {
    pub inside: BTreeSet<CombatantId>,
}

/// A reference is valid while the entity exists and is alive.
pub fn is_valid_target(world: &World, entity: Entity) -> bool {
    world
        .get::<&Status>(entity)
        .map(|status| status.alive)
        .unwrap_or(false)
}
