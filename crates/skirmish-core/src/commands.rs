//! Commands sent to the simulation by collaborators.
//!
//! Commands are queued and processed at the start of the next frame tick,
//! before target re-selection, so a same-tick exit or despawn is visible to
//! targeting.

use serde::{Deserialize, Serialize};

use crate::components::{CombatantId, Faction};

/// All inbound collaborator actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatCommand {
    /// Spatial collaborator: `other` entered `observer`'s detection volume.
    DetectionEnter {
        observer: CombatantId,
        other: CombatantId,
    },
    /// Spatial collaborator: `other` left `observer`'s detection volume.
    DetectionExit {
        observer: CombatantId,
        other: CombatantId,
    },
    /// Enable or disable an attacker (stun, loss of control, scripted hold).
    SetDisabled {
        combatant: CombatantId,
        disabled: bool,
    },
    /// Change a combatant's allegiance.
    SetFaction {
        combatant: CombatantId,
        faction: Faction,
    },
    /// Change a combatant's uniform scale.
    SetScale { combatant: CombatantId, scale: f64 },
    /// Remove a combatant from the world immediately.
    Despawn { combatant: CombatantId },
}
