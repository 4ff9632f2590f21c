//! # Inventory Store
//!
//! The stock table and every operation on it. One `InventoryStore` is owned
//! by the caller for the life of the process; there is no global state.
//!
//! ```text
//! InventoryStore
//! └── table: BTreeMap<String, u64>   // item name → quantity, always > 0
//! ```
//!
//! Failures never panic. Each operation logs what happened and returns a
//! `Result` so callers can branch on the outcome without reading the log.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use log::{debug, error, info, warn};

use crate::core::audit::AuditLog;
use crate::core::persist::{self, PersistError, StockTable};

/// Threshold used by `low_stock_default()`.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Item names must be non-empty.
    EmptyName,
    /// The request carried an item that isn't text.
    InvalidItemType(String),
    /// The request carried a quantity that isn't an integer.
    InvalidQuantityType { item: String, found: String },
    NegativeQuantity { item: String, qty: i64 },
    /// The request carried an integer too large to be a quantity.
    QuantityOutOfRange { item: String, raw: String },
    /// The resulting quantity doesn't fit in a `u64`.
    Overflow { item: String },
}

impl fmt::Display for StockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockError::EmptyName => write!(f, "item name must not be empty"),
            StockError::InvalidItemType(found) => {
                write!(f, "item must be a string, got {found}")
            }
            StockError::InvalidQuantityType { item, found } => {
                write!(f, "quantity for {item} must be an integer, got {found}")
            }
            StockError::NegativeQuantity { item, qty } => {
                write!(f, "negative quantity {qty} not allowed for {item}")
            }
            StockError::QuantityOutOfRange { item, raw } => {
                write!(f, "quantity {raw} for {item} is out of range")
            }
            StockError::Overflow { item } => write!(f, "quantity overflow for {item}"),
        }
    }
}

impl std::error::Error for StockError {}

/// What `remove` did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Stock left over after the removal.
    Reduced { remaining: u64 },
    /// The item hit zero (or below) and was dropped from the table.
    Depleted,
    /// The item wasn't stocked; nothing changed.
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryStore {
    table: StockTable,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing pairs. Empty names and zero quantities are
    /// skipped; repeated names are summed.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut table = StockTable::new();
        for (item, qty) in items {
            let item: String = item.into();
            if qty == 0 || item.is_empty() {
                continue;
            }
            let slot = table.entry(item).or_insert(0);
            *slot = slot.saturating_add(qty);
        }
        Self { table }
    }

    /// Add `qty` units of `item`. Returns the new quantity.
    pub fn add(&mut self, item: &str, qty: i64, audit: &mut AuditLog) -> Result<u64, StockError> {
        if item.is_empty() {
            warn!("Rejected add: item name must not be empty");
            return Err(StockError::EmptyName);
        }
        if qty < 0 {
            warn!("Negative quantity not allowed for {}", item);
            return Err(StockError::NegativeQuantity {
                item: item.to_string(),
                qty,
            });
        }

        let previous = self.quantity(item);
        let new_qty = previous.checked_add(qty as u64).ok_or_else(|| {
            warn!("Adding {} of {} would overflow", qty, item);
            StockError::Overflow {
                item: item.to_string(),
            }
        })?;

        if new_qty > 0 {
            self.table.insert(item.to_string(), new_qty);
        }
        audit.record(format!("Added {} of {}", qty, item));
        info!("Added {} of {}", qty, item);
        Ok(new_qty)
    }

    /// Remove `qty` units of `item`. Removing more than is stocked drops the
    /// item entirely rather than going negative.
    pub fn remove(
        &mut self,
        item: &str,
        qty: i64,
        audit: &mut AuditLog,
    ) -> Result<Removal, StockError> {
        if qty < 0 {
            error!("Invalid quantity {} for removing {}", qty, item);
            return Err(StockError::NegativeQuantity {
                item: item.to_string(),
                qty,
            });
        }

        let Some(current) = self.table.get_mut(item) else {
            warn!("Tried to remove non-existent item: {}", item);
            return Ok(Removal::Missing);
        };

        let removal = match current.checked_sub(qty as u64) {
            Some(remaining) if remaining > 0 => {
                *current = remaining;
                Removal::Reduced { remaining }
            }
            _ => {
                self.table.remove(item);
                Removal::Depleted
            }
        };
        audit.record(format!("Removed {} of {}", qty, item));
        info!("Removed {} of {}", qty, item);
        Ok(removal)
    }

    /// Stocked quantity, or 0 if the item isn't present.
    pub fn quantity(&self, item: &str) -> u64 {
        self.table.get(item).copied().unwrap_or(0)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.table.contains_key(item)
    }

    /// Items whose quantity is strictly below `threshold`, in table order.
    pub fn low_stock(&self, threshold: u64) -> Vec<String> {
        self.table
            .iter()
            .filter(|&(_, &qty)| qty < threshold)
            .map(|(item, _)| item.clone())
            .collect()
    }

    pub fn low_stock_default(&self) -> Vec<String> {
        self.low_stock(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    /// Replace the whole table with the contents of `path`.
    ///
    /// On any failure the table is reset to empty before the error is
    /// returned, so it is never left half-merged. Returns the item count.
    pub fn load(&mut self, path: &Path) -> Result<usize, PersistError> {
        match persist::read_table(path) {
            Ok(table) => {
                let before = table.len();
                self.table = table.into_iter().filter(|&(_, qty)| qty > 0).collect();
                if self.table.len() != before {
                    debug!("Dropped {} zero-quantity entries", before - self.table.len());
                }
                info!("Loaded inventory from {}", path.display());
                Ok(self.table.len())
            }
            Err(e) => {
                match &e {
                    PersistError::NotFound(_) => warn!("File not found: {}", path.display()),
                    PersistError::Decode { source, .. } => {
                        error!("Invalid JSON format: {}", source)
                    }
                    PersistError::Io { source, .. } => {
                        error!("Failed to read {}: {}", path.display(), source)
                    }
                }
                self.table.clear();
                Err(e)
            }
        }
    }

    /// Write the whole table to `path`. The in-memory table is untouched
    /// whether or not the write succeeds.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        match persist::write_table(path, &self.table) {
            Ok(()) => {
                info!("Saved inventory to {}", path.display());
                Ok(())
            }
            Err(e) => {
                error!("Failed to save data: {}", e);
                Err(e)
            }
        }
    }

    /// Writes the `Items Report` listing to `out`.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Items Report")?;
        for (item, qty) in &self.table {
            writeln!(out, "{} -> {}", item, qty)?;
        }
        Ok(())
    }

    /// Prints the report to stdout.
    pub fn report(&self) {
        let stdout = io::stdout();
        if let Err(e) = self.write_report(&mut stdout.lock()) {
            warn!("Failed to write report: {}", e);
        }
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, u64)> {
        self.table.iter().map(|(item, &qty)| (item.as_str(), qty))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for InventoryStore {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}
