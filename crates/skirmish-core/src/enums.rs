//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Per-attacker engagement state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementState {
    /// No candidates, or the attacker is disabled.
    #[default]
    Idle,
    /// Target selected but outside the attack radius; closing in.
    Pursuing,
    /// Target inside the attack radius; firing on cooldown.
    Attacking,
}

/// Target-selection policy applied to an attacker's candidate set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Minimum Euclidean distance.
    #[default]
    Closest,
    /// Minimum current health.
    LowestHealth,
    /// Maximum current health.
    HighestHealth,
}

/// Deterministic motion formula a projectile follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrajectoryKind {
    /// Direct line to the destination.
    #[default]
    Straight,
    /// Sine-wave lateral oscillation added to forward motion.
    Wavering,
    /// Triangle-wave lateral oscillation added to forward motion.
    Zigzag,
    /// Orbit around the approach axis, blended into the approach.
    Circular,
}

/// Damage classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Kinetic,
    Energy,
    Explosive,
    /// Ignores shields and goes straight to health.
    Piercing,
}

impl DamageType {
    pub fn bypasses_shield(self) -> bool {
        matches!(self, DamageType::Piercing)
    }
}

/// What the shield/health routing did with a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageRoute {
    /// Defender dodged; nothing was mutated.
    Dodged,
    /// The whole hit went into the shield.
    Shield,
    /// The hit went into health.
    Health,
}

/// Kind of pooled visual effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    #[default]
    Impact,
    Explosion,
}
