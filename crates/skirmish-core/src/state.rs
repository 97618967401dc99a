//! Combat state snapshot: the data replication, UI and telemetry read each tick.
//!
//! Getters on the engine and this snapshot are the source of truth for
//! health, shield and target id.

use serde::{Deserialize, Serialize};

use crate::components::{CombatantId, Faction};
use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::{Position, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSnapshot {
    pub time: SimTime,
    pub combatants: Vec<CombatantView>,
    pub projectiles: Vec<ProjectileView>,
    pub pools: PoolView,
    pub events: Vec<CombatEvent>,
}

/// One combatant as seen by collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: CombatantId,
    pub faction: Faction,
    pub position: Position,
    pub yaw: f64,
    pub health: f64,
    pub max_health: f64,
    /// Clamped to zero.
    pub shield: f64,
    pub alive: bool,
    pub state: EngagementState,
    /// `CombatantId::NONE` when there is no target.
    pub target: CombatantId,
}

/// One live projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Position,
    pub trajectory: TrajectoryKind,
    pub target: CombatantId,
    pub time_alive_secs: f64,
}

/// Aggregate pool occupancy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PoolView {
    pub projectiles_in_use: usize,
    pub projectiles_free: usize,
    pub effects_in_use: usize,
    pub effects_free: usize,
    /// Total misuse attempts (double release, foreign handle) so far.
    pub misuse_count: u64,
}
