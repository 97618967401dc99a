//! ECS systems that operate on the combat world each tick.
//!
//! Systems are free functions over `&mut World` plus whatever engine-owned
//! state they touch (pools, RNG, event buffer). They do not own state; all
//! state lives in components and the `PoolManager`.

pub mod candidates;
pub mod cleanup;
pub mod damage;
pub mod effects;
pub mod engagement;
pub mod movement;
pub mod projectiles;
pub mod sensor;
pub mod snapshot;
pub mod targeting;
