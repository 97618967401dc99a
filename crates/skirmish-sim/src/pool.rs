//! Object pool of reusable instances keyed by prototype.
//!
//! One `ObjectPool<T>` owns a slot arena of `T` plus a free list per
//! registered prototype. Callers hold a `PoolHandle`, which carries the slot
//! index, a generation and the prototype it was issued for, so releasing
//! never requires the caller to remember which sub-pool an instance came
//! from. A slot is either on exactly one free list or held by exactly one
//! live handle.
//!
//! Misuse (double release, foreign or stale handles) is logged and reported
//! as an error; it never touches the free lists.
//!
//! The per-prototype ceiling is soft: growing past it logs a warning and
//! bumps `PoolStats::over_ceiling`, but the instance is still constructed.

use std::collections::BTreeMap;

use thiserror::Error;

use skirmish_core::components::PrototypeId;
use skirmish_core::config::PoolConfig;

/// An instance type the pool can construct and recycle.
pub trait Reusable {
    type Prototype;

    /// Construct a fresh, Free instance from its prototype.
    fn instantiate(prototype: &Self::Prototype) -> Self;

    /// Clear transient state before the instance goes back on a free list.
    fn reset(&mut self, prototype: &Self::Prototype);
}

/// Distinguishes pools so a handle from one is rejected by another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(pub u16);

/// Reference to one acquisition of a pooled instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    slot: u32,
    generation: u32,
    pool: u16,
    prototype: PrototypeId,
}

impl PoolHandle {
    pub fn prototype(&self) -> PrototypeId {
        self.prototype
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("no prototype {0:?} registered in the {1} pool")]
    UnknownPrototype(PrototypeId, &'static str),
    #[error("handle {0:?} was already released to the {1} pool")]
    DoubleRelease(PoolHandle, &'static str),
    #[error("handle {0:?} was not issued by the {1} pool")]
    ForeignHandle(PoolHandle, &'static str),
}

/// Running counters for one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub constructed: u64,
    pub reused: u64,
    pub released: u64,
    pub misuse: u64,
    /// Constructions that took a prototype past the soft ceiling.
    pub over_ceiling: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    InUse,
}

struct Slot<T> {
    instance: T,
    prototype: PrototypeId,
    generation: u32,
    state: SlotState,
}

struct SubPool<P> {
    prototype: P,
    free: Vec<u32>,
    total: usize,
}

pub struct ObjectPool<T: Reusable> {
    id: PoolId,
    label: &'static str,
    slots: Vec<Slot<T>>,
    sub_pools: BTreeMap<PrototypeId, SubPool<T::Prototype>>,
    max_per_prototype: Option<usize>,
    stats: PoolStats,
}

impl<T: Reusable> ObjectPool<T> {
    pub fn new(id: PoolId, label: &'static str, config: &PoolConfig) -> Self {
        Self {
            id,
            label,
            slots: Vec::new(),
            sub_pools: BTreeMap::new(),
            max_per_prototype: config.max_per_prototype,
            stats: PoolStats::default(),
        }
    }

    /// Register (or replace) the prototype behind `id`.
    ///
    /// Replacing keeps existing instances; they pick up the new prototype on
    /// their next reset.
    pub fn register_prototype(&mut self, id: PrototypeId, prototype: T::Prototype) {
        match self.sub_pools.get_mut(&id) {
            Some(sub) => {
                tracing::debug!(pool = self.label, ?id, "prototype replaced");
                sub.prototype = prototype;
            }
            None => {
                self.sub_pools.insert(
                    id,
                    SubPool {
                        prototype,
                        free: Vec::new(),
                        total: 0,
                    },
                );
            }
        }
    }

    pub fn has_prototype(&self, id: PrototypeId) -> bool {
        self.sub_pools.contains_key(&id)
    }

    /// Construct up to `count` Free instances ahead of time. Prewarming
    /// stops at the ceiling.
    pub fn prewarm(&mut self, id: PrototypeId, count: usize) -> Result<(), PoolError> {
        let total = self
            .sub_pools
            .get(&id)
            .ok_or(PoolError::UnknownPrototype(id, self.label))?
            .total;
        let count = match self.max_per_prototype {
            Some(max) => count.min(max.saturating_sub(total)),
            None => count,
        };
        for _ in 0..count {
            let slot = self.construct(id)?;
            self.slots[slot as usize].state = SlotState::Free;
            if let Some(sub) = self.sub_pools.get_mut(&id) {
                sub.free.push(slot);
            }
        }
        Ok(())
    }

    /// Hand out a Free instance of `id`, constructing one if none is free.
    pub fn acquire(&mut self, id: PrototypeId) -> Result<PoolHandle, PoolError> {
        let sub = self
            .sub_pools
            .get_mut(&id)
            .ok_or(PoolError::UnknownPrototype(id, self.label))?;

        let slot = match sub.free.pop() {
            Some(slot) => {
                self.stats.reused += 1;
                slot
            }
            None => self.construct(id)?,
        };

        let entry = &mut self.slots[slot as usize];
        debug_assert_eq!(entry.prototype, id);
        entry.state = SlotState::InUse;
        Ok(PoolHandle {
            slot,
            generation: entry.generation,
            pool: self.id.0,
            prototype: id,
        })
    }

    /// Return an instance to its prototype's free list.
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        if let Err(err) = self.check_live(handle) {
            self.stats.misuse += 1;
            tracing::warn!(pool = self.label, error = %err, "pool release rejected");
            return Err(err);
        }

        let sub = self
            .sub_pools
            .get_mut(&handle.prototype)
            .ok_or(PoolError::UnknownPrototype(handle.prototype, self.label))?;
        let entry = &mut self.slots[handle.slot as usize];
        entry.instance.reset(&sub.prototype);
        entry.state = SlotState::Free;
        entry.generation = entry.generation.wrapping_add(1);
        sub.free.push(handle.slot);
        self.stats.released += 1;
        Ok(())
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.check_live(handle).ok()?;
        Some(&self.slots[handle.slot as usize].instance)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.check_live(handle).ok()?;
        Some(&mut self.slots[handle.slot as usize].instance)
    }

    pub fn is_live(&self, handle: PoolHandle) -> bool {
        self.check_live(handle).is_ok()
    }

    /// Live handles in slot order.
    pub fn in_use_handles(&self) -> Vec<PoolHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.state == SlotState::InUse)
            .map(|(idx, slot)| PoolHandle {
                slot: idx as u32,
                generation: slot.generation,
                pool: self.id.0,
                prototype: slot.prototype,
            })
            .collect()
    }

    pub fn in_use_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::InUse)
            .count()
    }

    pub fn free_count(&self) -> usize {
        self.sub_pools.values().map(|sub| sub.free.len()).sum()
    }

    pub fn free_count_for(&self, id: PrototypeId) -> usize {
        self.sub_pools.get(&id).map_or(0, |sub| sub.free.len())
    }

    /// Every instance ever constructed by this pool.
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    fn construct(&mut self, id: PrototypeId) -> Result<u32, PoolError> {
        let sub = self
            .sub_pools
            .get_mut(&id)
            .ok_or(PoolError::UnknownPrototype(id, self.label))?;
        if let Some(max) = self.max_per_prototype {
            if sub.total >= max {
                self.stats.over_ceiling += 1;
                tracing::warn!(
                    pool = self.label,
                    ?id,
                    ceiling = max,
                    total = sub.total + 1,
                    "pool grew past its soft ceiling"
                );
            }
        }

        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            instance: T::instantiate(&sub.prototype),
            prototype: id,
            generation: 0,
            state: SlotState::InUse,
        });
        sub.total += 1;
        self.stats.constructed += 1;
        Ok(slot)
    }

    fn check_live(&self, handle: PoolHandle) -> Result<(), PoolError> {
        if handle.pool != self.id.0 {
            return Err(PoolError::ForeignHandle(handle, self.label));
        }
        let entry = self
            .slots
            .get(handle.slot as usize)
            .ok_or(PoolError::ForeignHandle(handle, self.label))?;
        if entry.prototype != handle.prototype {
            return Err(PoolError::ForeignHandle(handle, self.label));
        }
        if entry.generation != handle.generation || entry.state == SlotState::Free {
            return Err(PoolError::DoubleRelease(handle, self.label));
        }
        Ok(())
    }
}
