//! Combat tuning configuration.
//!
//! Every field has a default from `constants`, so a partial JSON document is
//! valid. `sanitized()` clamps out-of-range values to safe minimums instead
//! of failing; configuration mistakes never stop a tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::PrototypeId;
use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid combat config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Fixed tick length in seconds.
    pub fixed_dt: FixedDt,
    pub targeting: TargetingConfig,
    pub candidates: CandidateConfig,
    pub engagement: EngagementConfig,
    pub projectiles: ProjectileConfig,
    pub damage: DamageConfig,
    pub effects: EffectConfig,
    pub pool: PoolConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedDt(pub f64);

impl Default for FixedDt {
    fn default() -> Self {
        Self(DT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    pub reselect_interval_secs: f64,
    pub switch_distance_margin: f64,
    pub switch_health_margin: f64,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            reselect_interval_secs: RESELECT_INTERVAL_SECS,
            switch_distance_margin: SWITCH_DISTANCE_MARGIN,
            switch_health_margin: SWITCH_HEALTH_MARGIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub cleanup_interval_secs: f64,
    /// Run the built-in spatial-hash sensor instead of relying on an
    /// external collaborator for enter/exit notifications.
    pub broadphase_enabled: bool,
    pub sensor_sweep_interval_secs: f64,
    pub sensor_cell_size: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: CANDIDATE_CLEANUP_INTERVAL_SECS,
            broadphase_enabled: false,
            sensor_sweep_interval_secs: SENSOR_SWEEP_INTERVAL_SECS,
            sensor_cell_size: SENSOR_CELL_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub lost_target_tolerance: f64,
    pub pursuit_stop_fraction: f64,
    pub turn_rate_rad_per_sec: f64,
    pub min_cooldown_secs: f64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            lost_target_tolerance: LOST_TARGET_TOLERANCE,
            pursuit_stop_fraction: PURSUIT_STOP_FRACTION,
            turn_rate_rad_per_sec: TURN_RATE_RAD_PER_SEC,
            min_cooldown_secs: MIN_COOLDOWN_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub radius: f64,
    pub arrival_epsilon: f64,
    pub orphan_timeout_secs: f64,
    pub amplitude: f64,
    pub frequency_hz: f64,
    pub blend_distance: f64,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            radius: PROJECTILE_RADIUS,
            arrival_epsilon: PROJECTILE_ARRIVAL_EPSILON,
            orphan_timeout_secs: PROJECTILE_ORPHAN_TIMEOUT_SECS,
            amplitude: TRAJECTORY_AMPLITUDE,
            frequency_hz: TRAJECTORY_FREQUENCY_HZ,
            blend_distance: TRAJECTORY_BLEND_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    pub knockback_decay_per_sec: f64,
    pub knockback_min_speed: f64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            knockback_decay_per_sec: KNOCKBACK_DECAY_PER_SEC,
            knockback_min_speed: KNOCKBACK_MIN_SPEED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Prefab used for area-of-effect explosions. Skipped when unset.
    pub explosion_prefab: Option<PrototypeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Soft per-prototype ceiling. Growing past it logs a warning but still
    /// constructs. `None` means pools grow without bound.
    pub max_per_prototype: Option<usize>,
    /// Instances constructed ahead of time for each registered prototype.
    pub prewarm: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub corpse_linger_secs: f64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            corpse_linger_secs: CORPSE_LINGER_SECS,
        }
    }
}

impl CombatConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp values that would stall or divide by zero.
    pub fn sanitized(mut self) -> Self {
        clamp_min("fixed_dt", &mut self.fixed_dt.0, 1e-4);
        clamp_min(
            "targeting.reselect_interval_secs",
            &mut self.targeting.reselect_interval_secs,
            0.0,
        );
        clamp_min(
            "targeting.switch_distance_margin",
            &mut self.targeting.switch_distance_margin,
            0.0,
        );
        clamp_min(
            "targeting.switch_health_margin",
            &mut self.targeting.switch_health_margin,
            0.0,
        );
        clamp_min(
            "candidates.cleanup_interval_secs",
            &mut self.candidates.cleanup_interval_secs,
            0.0,
        );
        clamp_min(
            "candidates.sensor_cell_size",
            &mut self.candidates.sensor_cell_size,
            1.0,
        );
        clamp_min(
            "engagement.lost_target_tolerance",
            &mut self.engagement.lost_target_tolerance,
            0.0,
        );
        clamp_min(
            "engagement.min_cooldown_secs",
            &mut self.engagement.min_cooldown_secs,
            MIN_COOLDOWN_SECS,
        );
        self.engagement.pursuit_stop_fraction = self.engagement.pursuit_stop_fraction.clamp(0.0, 1.0);
        clamp_min(
            "projectiles.arrival_epsilon",
            &mut self.projectiles.arrival_epsilon,
            1e-6,
        );
        clamp_min(
            "projectiles.blend_distance",
            &mut self.projectiles.blend_distance,
            1e-3,
        );
        clamp_min(
            "damage.knockback_decay_per_sec",
            &mut self.damage.knockback_decay_per_sec,
            0.0,
        );
        self
    }
}

fn clamp_min(name: &str, value: &mut f64, min: f64) {
    if !value.is_finite() || *value < min {
        tracing::warn!(field = name, value = *value, min, "config value clamped");
        *value = min;
    }
}
