//! String interner implementation using DashMap for concurrent access.
//!
//! The interner keeps two views of the same data: a concurrent map from
//! string to slot index (the interning path) and an append-only slot
//! vector from index to string (the `as_str` path). Strings are leaked
//! on first insertion to obtain `'static` references, which is acceptable
//! because interned names live for the program duration and the set of
//! unique names is bounded by the inputs.

use dashmap::DashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use super::Symbol;

/// Global string table instance, initialized on first use.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Thread-safe string table.
///
/// Lookups on the interning path go through `DashMap` without taking the
/// slot lock; only the first insertion of a new string serializes on the
/// slot vector's write lock, which also guards against two threads racing
/// to insert the same string.
pub struct StringTable {
    /// Maps interned string to its slot index.
    map: DashMap<&'static str, u32>,

    /// Slot index to interned string.
    slots: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(64),
            slots: RwLock::new(Vec::with_capacity(64)),
        }
    }

    /// Intern a string, returning its symbol.
    ///
    /// # Performance
    ///
    /// - Already interned: one lock-free map lookup.
    /// - New string: write lock on the slot vector, one allocation.
    pub fn intern(&self, string: &str) -> Symbol {
        // Fast path: string already interned.
        if let Some(index) = self.map.get(string) {
            return Symbol::from_index(*index);
        }

        // Slow path: serialize new insertions on the slot lock, then
        // re-check the map so a concurrent inserter of the same string
        // cannot produce a second slot.
        let mut slots = self
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = self.map.get(string) {
            return Symbol::from_index(*index);
        }

        let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
        let index = slots.len() as u32;
        slots.push(interned);
        self.map.insert(interned, index);
        Symbol::from_index(index)
    }

    /// Get the string for a symbol, if its slot exists.
    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        let slots = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        slots.get(symbol.as_u32() as usize).copied()
    }

    /// Number of unique interned strings.
    pub fn len(&self) -> usize {
        let slots = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        slots.len()
    }

    /// Returns true if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
