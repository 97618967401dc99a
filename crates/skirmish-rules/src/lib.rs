//! Combat rules for skirmish.
//!
//! Damage resolution, target selection, the engagement state machine and
//! projectile trajectory formulas, as plain functions over plain data.

pub mod damage;
pub mod fsm;
pub mod selection;
pub mod trajectory;

pub use skirmish_core as core;

#[cfg(test)]
mod tests;
