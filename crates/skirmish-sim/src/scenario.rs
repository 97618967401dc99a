//! Scenario definitions: JSON-loadable battle setups plus built-in ones.
//!
//! A scenario names the prototypes the pools need, the combatants to spawn
//! and the combat tuning to run them with.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::components::{Faction, PrototypeId, Weapon};
use skirmish_core::config::CombatConfig;
use skirmish_core::constants::*;
use skirmish_core::enums::{DamageType, EffectKind, TargetPolicy, TrajectoryKind};
use skirmish_core::types::Position;

use crate::world_setup::CombatantSpec;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("combatant {index} ({name}): {reason}")]
    InvalidCombatant {
        index: usize,
        name: String,
        reason: &'static str,
    },
    #[error("unknown built-in scenario {0:?}")]
    UnknownBuiltin(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectilePrototypeSpec {
    pub id: PrototypeId,
    pub name: String,
    #[serde(default = "default_projectile_radius")]
    pub radius: f64,
}

fn default_projectile_radius() -> f64 {
    PROJECTILE_RADIUS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectPrototypeSpec {
    pub id: PrototypeId,
    pub name: String,
    #[serde(default)]
    pub kind: EffectKind,
    pub lifetime_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    /// Fixed ticks the runner advances.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub config: CombatConfig,
    #[serde(default)]
    pub projectiles: Vec<ProjectilePrototypeSpec>,
    #[serde(default)]
    pub effects: Vec<EffectPrototypeSpec>,
    pub combatants: Vec<CombatantSpec>,
}

fn default_ticks() -> u64 {
    TICK_RATE as u64 * 30
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let mut scenario: Scenario = serde_json::from_str(json)?;
        scenario.config = scenario.config.sanitized();
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject combatants that cannot take part in a fight. Unknown prototype
    /// references are allowed; those shots are skipped at fire time.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (index, spec) in self.combatants.iter().enumerate() {
            let reason = if spec.max_health.is_nan() || spec.max_health <= 0.0 {
                Some("max_health must be positive")
            } else if spec.scale.is_nan() || spec.scale <= 0.0 {
                Some("scale must be positive")
            } else if spec.detection_radius < 0.0 || spec.attack_radius < 0.0 {
                Some("radii must not be negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ScenarioError::InvalidCombatant {
                    index,
                    name: spec.name.clone(),
                    reason,
                });
            }
            if let Some(weapon) = &spec.weapon {
                if !self.projectiles.iter().any(|p| p.id == weapon.projectile) {
                    tracing::warn!(
                        combatant = index,
                        prototype = weapon.projectile.0,
                        "weapon references an unregistered projectile prototype"
                    );
                }
            }
        }
        Ok(())
    }

    pub fn builtin(name: &str) -> Result<Self, ScenarioError> {
        match name {
            "duel" => Ok(duel()),
            "line_battle" => Ok(line_battle()),
            other => Err(ScenarioError::UnknownBuiltin(other.to_string())),
        }
    }
}

pub const BOLT: PrototypeId = PrototypeId(1);
pub const SHELL: PrototypeId = PrototypeId(2);
pub const SPARK: PrototypeId = PrototypeId(10);
pub const BLAST: PrototypeId = PrototypeId(11);

fn standard_prototypes() -> (Vec<ProjectilePrototypeSpec>, Vec<EffectPrototypeSpec>) {
    (
        vec![
            ProjectilePrototypeSpec {
                id: BOLT,
                name: "bolt".into(),
                radius: PROJECTILE_RADIUS,
            },
            ProjectilePrototypeSpec {
                id: SHELL,
                name: "shell".into(),
                radius: PROJECTILE_RADIUS * 2.0,
            },
        ],
        vec![
            EffectPrototypeSpec {
                id: SPARK,
                name: "spark".into(),
                kind: EffectKind::Impact,
                lifetime_secs: IMPACT_EFFECT_LIFETIME_SECS,
            },
            EffectPrototypeSpec {
                id: BLAST,
                name: "blast".into(),
                kind: EffectKind::Explosion,
                lifetime_secs: EXPLOSION_EFFECT_LIFETIME_SECS,
            },
        ],
    )
}

fn rifle(trajectory: TrajectoryKind) -> Weapon {
    Weapon {
        projectile: BOLT,
        impact_effect: Some(SPARK),
        damage: 12.0,
        damage_type: DamageType::Kinetic,
        crit_chance: 0.2,
        crit_multiplier: CRIT_MULTIPLIER,
        cooldown_secs: 0.8,
        cooldown_remaining_secs: 0.0,
        cannon_points: vec![Position::new(0.0, 0.6, 1.2)],
        trajectory,
        projectile_speed: PROJECTILE_SPEED,
        max_lifespan_secs: PROJECTILE_MAX_LIFESPAN_SECS,
        aoe_radius: None,
        knockback: 0.0,
    }
}

fn mortar() -> Weapon {
    Weapon {
        projectile: SHELL,
        impact_effect: Some(SPARK),
        damage: 30.0,
        damage_type: DamageType::Explosive,
        crit_chance: 0.05,
        crit_multiplier: CRIT_MULTIPLIER,
        cooldown_secs: 2.5,
        cooldown_remaining_secs: 0.0,
        cannon_points: vec![Position::new(-0.4, 0.5, 1.5), Position::new(0.4, 0.5, 1.5)],
        trajectory: TrajectoryKind::Circular,
        projectile_speed: PROJECTILE_SPEED * 0.5,
        max_lifespan_secs: PROJECTILE_MAX_LIFESPAN_SECS,
        aoe_radius: Some(4.0),
        knockback: 6.0,
    }
}

fn soldier(faction: u16, position: Position, weapon: Weapon) -> CombatantSpec {
    CombatantSpec {
        name: format!("f{faction}-{:.0}", position.x),
        faction: Faction(faction),
        position,
        yaw: if faction == 0 { 0.0 } else { std::f64::consts::PI },
        max_health: 100.0,
        shield: 25.0,
        dodge_chance: 0.15,
        detection_radius: 40.0,
        attack_radius: 18.0,
        scale: 1.0,
        body_radius: DEFAULT_BODY_RADIUS,
        speed: Some(3.0),
        mass: Some(80.0),
        policy: TargetPolicy::Closest,
        weapon: Some(weapon),
    }
}

/// Two riflemen walking into range of each other.
fn duel() -> Scenario {
    let (projectiles, effects) = standard_prototypes();
    let mut config = CombatConfig::default();
    config.candidates.broadphase_enabled = true;
    Scenario {
        name: "duel".into(),
        seed: 7,
        ticks: TICK_RATE as u64 * 20,
        config,
        projectiles,
        effects,
        combatants: vec![
            soldier(0, Position::new(0.0, 0.0, 0.0), rifle(TrajectoryKind::Straight)),
            soldier(1, Position::new(0.0, 35.0, 0.0), rifle(TrajectoryKind::Wavering)),
        ],
    }
}

/// Two lines of five facing off, with mortars and mixed target policies.
fn line_battle() -> Scenario {
    let (projectiles, effects) = standard_prototypes();
    let mut config = CombatConfig::default();
    config.candidates.broadphase_enabled = true;
    config.effects.explosion_prefab = Some(BLAST);

    let trajectories = [
        TrajectoryKind::Straight,
        TrajectoryKind::Wavering,
        TrajectoryKind::Zigzag,
        TrajectoryKind::Circular,
    ];
    let mut combatants = Vec::new();
    for (faction, y) in [(0u16, 0.0), (1u16, 30.0)] {
        for i in 0..5 {
            let x = (i as f64 - 2.0) * 6.0;
            let weapon = if i == 2 {
                mortar()
            } else {
                rifle(trajectories[(i + faction as usize) % trajectories.len()])
            };
            let mut spec = soldier(faction, Position::new(x, y, 0.0), weapon);
            spec.policy = match i {
                1 => TargetPolicy::LowestHealth,
                3 => TargetPolicy::HighestHealth,
                _ => TargetPolicy::Closest,
            };
            combatants.push(spec);
        }
    }

    Scenario {
        name: "line_battle".into(),
        seed: 42,
        ticks: TICK_RATE as u64 * 60,
        config,
        projectiles,
        effects,
        combatants,
    }
}
