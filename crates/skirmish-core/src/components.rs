//! ECS components for hecs entities.
//!
//! Components are plain data structs. Game logic lives in systems and in
//! the pure rules crate, not here. Components that hold entity references
//! live in the sim crate.

use serde::{Deserialize, Serialize};

use crate::constants::{CRIT_MULTIPLIER, PROJECTILE_MAX_LIFESPAN_SECS, PROJECTILE_SPEED};
use crate::enums::*;
use crate::types::{Position, Velocity};

/// Stable, non-zero combatant id. `0` means "no combatant".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    pub const NONE: CombatantId = CombatantId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Team allegiance. Combatants of different factions are hostile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faction(pub u16);

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }
}

/// Identity of a pooled-instance prototype (projectile or effect prefab).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrototypeId(pub u32);

/// Marks an entity as able to deal or receive combat damage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub faction: Faction,
}

/// Orientation. Yaw is a bearing (0 = North, clockwise); pitch is elevation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Facing {
    pub yaw: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }
}

/// Shield points absorb hits before health does.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Shield {
    pub points: f64,
    pub max: f64,
}

impl Shield {
    pub fn full(max: f64) -> Self {
        Self { points: max, max }
    }

    /// Shield value as shown to players and replicated.
    pub fn display(&self) -> f64 {
        self.points.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Defense {
    /// Probability in [0, 1] that an incoming hit is dodged.
    pub dodge_chance: f64,
}

/// Liveness and control state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Status {
    pub alive: bool,
    /// Voluntarily disabled, stunned, or otherwise out of control.
    pub disabled: bool,
    /// Simulation time of death, for corpse cleanup.
    pub died_at_secs: Option<f64>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            alive: true,
            disabled: false,
            died_at_secs: None,
        }
    }
}

/// Unscaled detection and attack radii (meters).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sensors {
    pub detection_radius: f64,
    pub attack_radius: f64,
}

/// Current uniform scale. Radii and body size are multiplied by it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale(pub f64);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Collision footprint (unscaled sphere radius, meters).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub radius: f64,
}

/// Movement capability for the built-in movement system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobility {
    /// Max speed in m/s.
    pub speed: f64,
}

/// Present on combatants that can be physically displaced by knockback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Physical {
    pub mass: f64,
}

/// Residual knockback velocity, decays each fixed tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Knockback {
    pub velocity: Velocity,
}

/// Movement destination override requested by the engagement state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveOrder {
    pub destination: Position,
    /// Stop once within this distance of the destination.
    pub stop_distance: f64,
}

/// Ranged weapon mounted on an attacker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    /// Pool prototype for launched projectiles.
    pub projectile: PrototypeId,
    /// Pool prototype for the impact effect, if any.
    #[serde(default)]
    pub impact_effect: Option<PrototypeId>,
    pub damage: f64,
    #[serde(default)]
    pub damage_type: DamageType,
    #[serde(default)]
    pub crit_chance: f64,
    #[serde(default = "default_crit_multiplier")]
    pub crit_multiplier: f64,
    pub cooldown_secs: f64,
    /// Time until the next shot is allowed. Starts at `cooldown_secs`.
    #[serde(default)]
    pub cooldown_remaining_secs: f64,
    /// Muzzle offsets in the attacker's local frame (x = right, y = forward, z = up).
    pub cannon_points: Vec<Position>,
    #[serde(default)]
    pub trajectory: TrajectoryKind,
    #[serde(default = "default_projectile_speed")]
    pub projectile_speed: f64,
    #[serde(default = "default_max_lifespan")]
    pub max_lifespan_secs: f64,
    /// Area-of-effect radius; `None` for single-target projectiles.
    #[serde(default)]
    pub aoe_radius: Option<f64>,
    /// Knockback strength at zero distance.
    #[serde(default)]
    pub knockback: f64,
}

fn default_crit_multiplier() -> f64 {
    CRIT_MULTIPLIER
}

fn default_projectile_speed() -> f64 {
    PROJECTILE_SPEED
}

fn default_max_lifespan() -> f64 {
    PROJECTILE_MAX_LIFESPAN_SECS
}

impl Weapon {
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining_secs <= crate::constants::COOLDOWN_EPSILON
    }
}
