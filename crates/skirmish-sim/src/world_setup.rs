//! Entity spawn factories for setting up the combat world.

use hecs::{EntityBuilder, World};
use serde::{Deserialize, Serialize};

use skirmish_core::components::*;
use skirmish_core::constants::DEFAULT_BODY_RADIUS;
use skirmish_core::enums::TargetPolicy;
use skirmish_core::types::Position;

use crate::tracking::{Candidates, Engagement, SensorMemory, Targeting};

/// Everything needed to spawn one combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantSpec {
    #[serde(default)]
    pub name: String,
    pub faction: Faction,
    pub position: Position,
    /// Initial bearing (radians, 0 = North, clockwise).
    #[serde(default)]
    pub yaw: f64,
    pub max_health: f64,
    #[serde(default)]
    pub shield: f64,
    #[serde(default)]
    pub dodge_chance: f64,
    pub detection_radius: f64,
    pub attack_radius: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_body_radius")]
    pub body_radius: f64,
    /// Walking speed; stationary when absent.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Mass for knockback; immovable when absent.
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub policy: TargetPolicy,
    /// Attackers carry a weapon; pure defenders do not.
    #[serde(default)]
    pub weapon: Option<Weapon>,
}

fn default_scale() -> f64 {
    1.0
}

fn default_body_radius() -> f64 {
    DEFAULT_BODY_RADIUS
}

impl CombatantSpec {
    /// A stationary defender with no weapon.
    pub fn dummy(faction: Faction, position: Position, max_health: f64) -> Self {
        Self {
            name: String::new(),
            faction,
            position,
            yaw: 0.0,
            max_health,
            shield: 0.0,
            dodge_chance: 0.0,
            detection_radius: 0.0,
            attack_radius: 0.0,
            scale: 1.0,
            body_radius: DEFAULT_BODY_RADIUS,
            speed: None,
            mass: None,
            policy: TargetPolicy::default(),
            weapon: None,
        }
    }
}

/// Spawn a combatant. Weapons start on a full cooldown.
pub fn spawn_combatant(world: &mut World, id: CombatantId, spec: &CombatantSpec) -> hecs::Entity {
    let mut builder = EntityBuilder::new();
    builder
        .add(Combatant {
            id,
            faction: spec.faction,
        })
        .add(spec.position)
        .add(Facing {
            yaw: spec.yaw,
            pitch: 0.0,
        })
        .add(Health::full(spec.max_health))
        .add(Shield::full(spec.shield.max(0.0)))
        .add(Defense {
            dodge_chance: spec.dodge_chance.clamp(0.0, 1.0),
        })
        .add(Status::default())
        .add(Sensors {
            detection_radius: spec.detection_radius.max(0.0),
            attack_radius: spec.attack_radius.max(0.0),
        })
        .add(Scale(spec.scale))
        .add(Body {
            radius: spec.body_radius.max(0.0),
        });

    if let Some(speed) = spec.speed {
        builder.add(Mobility { speed });
    }
    if let Some(mass) = spec.mass {
        builder.add(Physical { mass });
    }
    if let Some(weapon) = &spec.weapon {
        let mut weapon = weapon.clone();
        weapon.cooldown_remaining_secs = weapon.cooldown_secs.max(0.0);
        builder
            .add(weapon)
            .add(Targeting::new(spec.policy))
            .add(Candidates::default())
            .add(Engagement::default())
            .add(SensorMemory::default());
    }

    world.spawn(builder.build())
}
