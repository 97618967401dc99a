//! Pooled instance data model: projectiles and visual effects.
//!
//! Stored in the `PoolManager`'s pools, NOT as ECS entities. A projectile
//! refers to its target by `hecs::Entity`, which goes stale when the target
//! is despawned; staleness is checked every tick, never assumed.

use skirmish_core::components::{CombatantId, Faction, PrototypeId};
use skirmish_core::config::PoolConfig;
use skirmish_core::enums::{DamageType, EffectKind, TrajectoryKind};
use skirmish_core::types::Position;

use crate::pool::{ObjectPool, PoolId, Reusable};

/// Projectile prefab.
#[derive(Debug, Clone)]
pub struct ProjectilePrototype {
    pub name: String,
    /// Collision radius (meters).
    pub radius: f64,
}

/// A live projectile, owned by the projectile pool while In-Use.
#[derive(Debug, Clone, Default)]
pub struct Projectile {
    pub owner: Option<hecs::Entity>,
    pub owner_id: CombatantId,
    pub faction: Faction,
    pub speed: f64,
    pub base_damage: f64,
    pub damage_type: DamageType,
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub trajectory: TrajectoryKind,

    // --- Target ---
    /// Weak reference: invalid once the target is despawned or dead.
    pub target: Option<hecs::Entity>,
    pub target_id: CombatantId,
    pub last_known_target: Position,
    /// Seconds since the bound target was lost.
    pub lost_target_secs: Option<f64>,

    // --- Flight ---
    pub origin: Position,
    /// Unperturbed straight-line point the trajectory offsets are added to.
    pub base: Position,
    pub position: Position,
    pub travelled: f64,
    pub time_alive_secs: f64,
    pub max_lifespan_secs: f64,
    pub radius: f64,

    // --- Impact ---
    pub aoe_radius: Option<f64>,
    pub knockback: f64,
    pub impact_effect: Option<PrototypeId>,
    /// Set on the first impact call; later calls are ignored.
    pub impacted: bool,
}

impl Reusable for Projectile {
    type Prototype = ProjectilePrototype;

    fn instantiate(prototype: &ProjectilePrototype) -> Self {
        Self {
            radius: prototype.radius,
            ..Default::default()
        }
    }

    fn reset(&mut self, prototype: &ProjectilePrototype) {
        *self = Self::instantiate(prototype);
    }
}

/// Effect prefab.
#[derive(Debug, Clone)]
pub struct EffectPrototype {
    pub name: String,
    pub kind: EffectKind,
    pub lifetime_secs: f64,
}

/// A playing effect, released back to the effect pool when it expires.
#[derive(Debug, Clone, Default)]
pub struct Effect {
    pub kind: EffectKind,
    pub position: Position,
    pub yaw: f64,
    pub pitch: f64,
    pub scale: f64,
    pub remaining_secs: f64,
    pub lifetime_secs: f64,
}

impl Reusable for Effect {
    type Prototype = EffectPrototype;

    fn instantiate(prototype: &EffectPrototype) -> Self {
        Self {
            kind: prototype.kind,
            scale: 1.0,
            lifetime_secs: prototype.lifetime_secs,
            ..Default::default()
        }
    }

    fn reset(&mut self, prototype: &EffectPrototype) {
        *self = Self::instantiate(prototype);
    }
}

/// Session-scoped owner of every object pool. Created with the engine and
/// passed explicitly to the systems that acquire or release.
pub struct PoolManager {
    pub projectiles: ObjectPool<Projectile>,
    pub effects: ObjectPool<Effect>,
    prewarm: usize,
}

impl PoolManager {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            projectiles: ObjectPool::new(PoolId(1), "projectile", config),
            effects: ObjectPool::new(PoolId(2), "effect", config),
            prewarm: config.prewarm,
        }
    }

    pub fn register_projectile(&mut self, id: PrototypeId, prototype: ProjectilePrototype) {
        self.projectiles.register_prototype(id, prototype);
        if let Err(err) = self.projectiles.prewarm(id, self.prewarm) {
            tracing::warn!(error = %err, "projectile prewarm stopped early");
        }
    }

    pub fn register_effect(&mut self, id: PrototypeId, prototype: EffectPrototype) {
        self.effects.register_prototype(id, prototype);
        if let Err(err) = self.effects.prewarm(id, self.prewarm) {
            tracing::warn!(error = %err, "effect prewarm stopped early");
        }
    }

    pub fn misuse_count(&self) -> u64 {
        self.projectiles.stats().misuse + self.effects.stats().misuse
    }
}
