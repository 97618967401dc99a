//! Simulation constants and default tuning parameters.
//!
//! `CombatConfig::default()` is built from these values.

/// Fixed simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per fixed tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Cooldown values at or below this count as "ready".
pub const COOLDOWN_EPSILON: f64 = 1e-9;

// --- Targeting ---

/// Interval between routine target re-selections (seconds).
pub const RESELECT_INTERVAL_SECS: f64 = 0.25;

/// A Closest challenger must be nearer than the incumbent by more than this (meters).
pub const SWITCH_DISTANCE_MARGIN: f64 = 2.0;

/// A health-policy challenger must beat the incumbent by more than this (hit points).
pub const SWITCH_HEALTH_MARGIN: f64 = 10.0;

// --- Candidate tracking ---

/// Interval between candidate-set cleanup passes (seconds).
pub const CANDIDATE_CLEANUP_INTERVAL_SECS: f64 = 0.5;

/// Interval between broadphase sensor sweeps (seconds).
pub const SENSOR_SWEEP_INTERVAL_SECS: f64 = 0.1;

/// Spatial hash cell edge length for the broadphase sensor (meters).
pub const SENSOR_CELL_SIZE: f64 = 25.0;

// --- Engagement ---

/// Fraction of the scaled detection radius tolerated before a target counts as lost.
pub const LOST_TARGET_TOLERANCE: f64 = 0.1;

/// Pursuit stops at this fraction of the scaled attack radius.
pub const PURSUIT_STOP_FRACTION: f64 = 0.9;

/// A pursuit move order is re-issued once the target drifts this far (meters).
pub const MOVE_ORDER_REFRESH_DISTANCE: f64 = 0.5;

/// Facing turn rate (radians per second).
pub const TURN_RATE_RAD_PER_SEC: f64 = std::f64::consts::TAU;

/// Floor applied to configured weapon cooldowns (seconds).
pub const MIN_COOLDOWN_SECS: f64 = 0.05;

// --- Projectiles ---

/// Default projectile speed (m/s).
pub const PROJECTILE_SPEED: f64 = 40.0;

/// Default projectile lifespan (seconds).
pub const PROJECTILE_MAX_LIFESPAN_SECS: f64 = 5.0;

/// Collision radius of a projectile (meters).
pub const PROJECTILE_RADIUS: f64 = 0.25;

/// Arrival epsilon for reaching the destination (meters).
pub const PROJECTILE_ARRIVAL_EPSILON: f64 = 0.05;

/// After losing its target, a projectile gives up after this long (seconds).
pub const PROJECTILE_ORPHAN_TIMEOUT_SECS: f64 = 3.0;

/// Lateral amplitude of wavering/zigzag/circular trajectories (meters).
pub const TRAJECTORY_AMPLITUDE: f64 = 1.5;

/// Oscillation frequency of wavering/zigzag/circular trajectories (Hz).
pub const TRAJECTORY_FREQUENCY_HZ: f64 = 2.0;

/// Lateral offsets fade out over this distance from the destination (meters).
pub const TRAJECTORY_BLEND_DISTANCE: f64 = 5.0;

// --- Damage ---

/// Default critical multiplier.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Decay rate of knockback velocity (1/s).
pub const KNOCKBACK_DECAY_PER_SEC: f64 = 4.0;

/// Knockback velocity below this is dropped (m/s).
pub const KNOCKBACK_MIN_SPEED: f64 = 0.01;

/// Body radius used when a combatant spec leaves it out (meters).
pub const DEFAULT_BODY_RADIUS: f64 = 0.5;

// --- Effects ---

/// Lifetime of a pooled impact effect (seconds).
pub const IMPACT_EFFECT_LIFETIME_SECS: f64 = 0.5;

/// Lifetime of a pooled explosion effect (seconds).
pub const EXPLOSION_EFFECT_LIFETIME_SECS: f64 = 1.0;

// --- Cleanup ---

/// Dead combatants are despawned after this long (seconds).
pub const CORPSE_LINGER_SECS: f64 = 2.0;
