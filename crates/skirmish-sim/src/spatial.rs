//! Uniform spatial hash over combatant positions.
//!
//! Rebuilt from scratch on every sensor sweep. Queries return ids in
//! ascending order so the enter/exit commands derived from them are
//! deterministic.

use std::collections::HashMap;

use skirmish_core::components::CombatantId;
use skirmish_core::types::Position;

type Cell = (i64, i64, i64);

pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<Cell, Vec<(CombatantId, Position)>>,
}

impl SpatialHash {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    pub fn build(cell_size: f64, points: impl IntoIterator<Item = (CombatantId, Position)>) -> Self {
        let mut hash = Self::new(cell_size);
        for (id, pos) in points {
            hash.insert(id, pos);
        }
        hash
    }

    pub fn insert(&mut self, id: CombatantId, pos: Position) {
        let cell = self.cell_of(&pos);
        self.cells.entry(cell).or_default().push((id, pos));
    }

    /// Ids within `radius` of `center` (inclusive), sorted ascending.
    pub fn query_sphere(&self, center: &Position, radius: f64) -> Vec<CombatantId> {
        let radius = radius.max(0.0);
        let radius_sq = radius * radius;
        let span = (radius / self.cell_size).ceil() as i64;
        let (cx, cy, cz) = self.cell_of(center);

        let mut found = Vec::new();
        let side = (2 * span + 1) as usize;
        if side.saturating_mul(side).saturating_mul(side) > self.cells.len() {
            // Cheaper to scan every occupied cell.
            for bucket in self.cells.values() {
                for (id, pos) in bucket {
                    if center.range_sq_to(pos) <= radius_sq {
                        found.push(*id);
                    }
                }
            }
            found.sort_unstable();
            return found;
        }

        for dx in -span..=span {
            for dy in -span..=span {
                for dz in -span..=span {
                    let Some(bucket) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for (id, pos) in bucket {
                        if center.range_sq_to(pos) <= radius_sq {
                            found.push(*id);
                        }
                    }
                }
            }
        }
        found.sort_unstable();
        found
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell_of(&self, pos: &Position) -> Cell {
        (
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
            (pos.z / self.cell_size).floor() as i64,
        )
    }
}
