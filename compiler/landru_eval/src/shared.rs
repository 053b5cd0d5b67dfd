//! Per-machine-type shared variables.
//!
//! A cell exists while at least one live instance of its machine type
//! holds a reference. The first reference initializes it; dropping the
//! last one frees it, so the next instance starts from the default again.

use landru_ir::{ExemplarId, Name};
use rustc_hash::FxHashMap;

use crate::Value;

/// Machine exemplar plus variable name.
pub type SharedKey = (ExemplarId, Name);

#[derive(Clone, Debug)]
struct SharedCell {
    value: Value,
    refcount: u32,
}

#[derive(Clone, Debug, Default)]
pub struct SharedCells {
    cells: FxHashMap<SharedKey, SharedCell>,
}

impl SharedCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take another reference on a live cell. `false` if the cell does not
    /// exist and must be created.
    pub fn retain(&mut self, key: SharedKey) -> bool {
        match self.cells.get_mut(&key) {
            Some(cell) => {
                cell.refcount = cell.refcount.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Create a cell holding one reference.
    pub fn create(&mut self, key: SharedKey, value: Value) {
        self.cells.insert(key, SharedCell { value, refcount: 1 });
    }

    /// Drop a reference. Returns `true` if that freed the cell.
    pub fn release(&mut self, key: SharedKey) -> bool {
        let Some(cell) = self.cells.get_mut(&key) else {
            return false;
        };
        cell.refcount = cell.refcount.saturating_sub(1);
        if cell.refcount == 0 {
            self.cells.remove(&key);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn contains(&self, key: SharedKey) -> bool {
        self.cells.contains_key(&key)
    }

    pub fn get(&self, key: SharedKey) -> Option<&Value> {
        self.cells.get(&key).map(|cell| &cell.value)
    }

    /// Overwrite a live cell. Returns `false` if it does not exist.
    pub fn set(&mut self, key: SharedKey, value: Value) -> bool {
        match self.cells.get_mut(&key) {
            Some(cell) => {
                cell.value = value;
                true
            }
            None => false,
        }
    }

    pub fn refcount(&self, key: SharedKey) -> u32 {
        self.cells.get(&key).map_or(0, |cell| cell.refcount)
    }
}

#[cfg(test)]
mod tests;
