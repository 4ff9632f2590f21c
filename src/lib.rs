//! Stockroom library exports for the CLI and integration tests

pub mod cli;
pub mod core;

#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    Action, ActionError, AuditEntry, AuditLog, InventoryStore, Outcome, PersistError, Removal,
    StockError, apply,
};
