//! Combat simulation engine for skirmish.
//!
//! Owns the hecs ECS world and the session's object pools, runs the combat
//! systems on a fixed step plus a frame step, and produces `CombatSnapshot`s.

pub mod engine;
pub mod pool;
pub mod projectile;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod tracking;
pub mod world_setup;

pub use engine::{CombatEngine, SimConfig};
pub use skirmish_core as core;
