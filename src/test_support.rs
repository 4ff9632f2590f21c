//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::store::InventoryStore;

/// Creates a store already holding the given stock.
pub fn stocked(items: &[(&str, u64)]) -> InventoryStore {
    items.iter().map(|&(item, qty)| (item, qty)).collect()
}
