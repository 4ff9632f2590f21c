//! # Core Inventory Logic
//!
//! Everything Stockroom knows about stock lives here. It knows nothing
//! about the command line (see `crate::cli`) or where log lines end up.
//!
//! ```text
//!        ┌──────────────┐
//!        │  cli / main  │   clap CLI, logger setup
//!        └──────┬───────┘
//!               │ Action
//!               ▼
//!        ┌──────────────┐     ┌──────────────┐
//!        │   action     │────▶│    audit     │
//!        │  apply()     │     │  AuditLog    │
//!        └──────┬───────┘     └──────────────┘
//!               ▼
//!        ┌──────────────┐     ┌──────────────┐
//!        │    store     │────▶│   persist    │──▶ inventory.json
//!        │InventoryStore│     │  read/write  │
//!        └──────────────┘     └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`]: `InventoryStore`, the stock table and its operations
//! - [`action`]: the `Action` enum, raw-request validation and `apply()`
//! - [`audit`]: the caller-owned audit trail
//! - [`persist`]: JSON stock file format
//! - [`config`]: config file and override resolution

pub mod action;
pub mod audit;
pub mod config;
pub mod persist;
pub mod store;

// Re-export commonly used types for convenience
pub use action::{Action, ActionError, Outcome, RequestDefaults, apply};
pub use audit::{AuditEntry, AuditLog};
pub use persist::PersistError;
pub use store::{InventoryStore, Removal, StockError};
