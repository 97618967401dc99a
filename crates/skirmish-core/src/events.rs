//! Events emitted by the simulation for collaborators (movement, animation,
//! effects, UI, replication).
//!
//! Combatants are referred to by `CombatantId`, never by ECS handle.

use serde::{Deserialize, Serialize};

use crate::components::{CombatantId, PrototypeId};
use crate::enums::*;
use crate::types::Position;

/// Outbound signal produced during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// Movement collaborator: go to `destination`, stop at `stop_distance`.
    MoveRequested {
        combatant: CombatantId,
        destination: Position,
        stop_distance: f64,
    },
    /// Movement collaborator: drop any destination override.
    MoveReset { combatant: CombatantId },
    /// Animation collaborator: fire-and-forget trigger (e.g. "Attack").
    AnimationTrigger {
        combatant: CombatantId,
        trigger: String,
    },
    /// Engagement state transition.
    StateChanged {
        combatant: CombatantId,
        from: EngagementState,
        to: EngagementState,
    },
    /// Current target changed (`CombatantId::NONE` when cleared).
    TargetChanged {
        combatant: CombatantId,
        target: CombatantId,
    },
    /// Attacker launched `projectiles` projectiles at `target`.
    Fired {
        attacker: CombatantId,
        target: CombatantId,
        projectiles: u32,
    },
    /// Effect collaborator: impact prefab played from the effect pool.
    ImpactPlayed {
        prefab: PrototypeId,
        position: Position,
        yaw: f64,
        pitch: f64,
    },
    /// Effect collaborator: explosion played from the effect pool.
    ExplosionPlayed {
        prefab: PrototypeId,
        position: Position,
        scale: f64,
    },
    /// Damage applied to a defender.
    Damaged {
        defender: CombatantId,
        amount: f64,
        damage_type: DamageType,
        critical: bool,
        route: DamageRoute,
    },
    /// Defender dodged a hit.
    Dodged { defender: CombatantId },
    /// Defender died.
    Killed { defender: CombatantId },
}
