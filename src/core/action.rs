//! # Actions
//!
//! Everything the store can be asked to do becomes an `Action`.
//! `apply()` takes the store, an action and the audit trail, and returns an
//! `Outcome` describing what happened.
//!
//! ```text
//! Store + Action  →  apply()  →  Outcome
//! ```
//!
//! Untyped requests (e.g. a batch file) go through `Action::from_value`
//! first, which is where wrong-typed items and quantities are refused.

use std::fmt;
use std::path::PathBuf;

use log::warn;
use serde_json::Value;

use crate::core::audit::AuditLog;
use crate::core::persist::{DEFAULT_DATA_FILE, PersistError};
use crate::core::store::{DEFAULT_LOW_STOCK_THRESHOLD, InventoryStore, Removal, StockError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { item: String, qty: i64 },
    Remove { item: String, qty: i64 },
    Quantity { item: String },
    LowStock { threshold: u64 },
    Report,
    Save { path: PathBuf },
    Load { path: PathBuf },
}

/// Result of a successfully applied action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { item: String, quantity: u64 },
    Removed { item: String, removal: Removal },
    Quantity { item: String, quantity: u64 },
    LowStock(Vec<String>),
    Reported,
    Saved(PathBuf),
    Loaded { path: PathBuf, items: usize },
}

#[derive(Debug)]
pub enum ActionError {
    Stock(StockError),
    Persist(PersistError),
    /// The request object itself is unusable (missing or unknown `op`).
    Malformed(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Stock(e) => write!(f, "{e}"),
            ActionError::Persist(e) => write!(f, "{e}"),
            ActionError::Malformed(msg) => write!(f, "malformed request: {msg}"),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::Stock(e) => Some(e),
            ActionError::Persist(e) => Some(e),
            ActionError::Malformed(_) => None,
        }
    }
}

impl From<StockError> for ActionError {
    fn from(e: StockError) -> Self {
        ActionError::Stock(e)
    }
}

impl From<PersistError> for ActionError {
    fn from(e: PersistError) -> Self {
        ActionError::Persist(e)
    }
}

/// Values used when a request leaves out an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    pub low_stock_threshold: u64,
    pub data_file: PathBuf,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

/// Short name of a JSON value's type, for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Action {
    /// Validate an untyped request such as
    /// `{"op": "add", "item": "apple", "qty": 10}`.
    ///
    /// Nothing is coerced: a numeric item or a string/float quantity is
    /// rejected rather than converted. Missing `threshold` and `path` fields
    /// fall back to `defaults`.
    pub fn from_value(value: &Value, defaults: &RequestDefaults) -> Result<Action, ActionError> {
        let op = value
            .get("op")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::Malformed("missing \"op\" field".to_string()))?;

        let action = match op {
            "add" | "remove" => {
                let item = item_field(value)?;
                let qty = qty_field(value, &item)?;
                if op == "add" {
                    Action::Add { item, qty }
                } else {
                    Action::Remove { item, qty }
                }
            }
            "quantity" | "qty" => Action::Quantity {
                item: item_field(value)?,
            },
            "low_stock" | "low" => {
                let threshold = match value.get("threshold") {
                    None => defaults.low_stock_threshold,
                    Some(t) => t.as_u64().ok_or_else(|| {
                        ActionError::Malformed(format!(
                            "threshold must be a non-negative integer, got {}",
                            type_name(t)
                        ))
                    })?,
                };
                Action::LowStock { threshold }
            }
            "report" => Action::Report,
            "save" | "load" => {
                let path = match value.get("path") {
                    None => defaults.data_file.clone(),
                    Some(Value::String(p)) => PathBuf::from(p),
                    Some(other) => {
                        return Err(ActionError::Malformed(format!(
                            "path must be a string, got {}",
                            type_name(other)
                        )));
                    }
                };
                if op == "save" {
                    Action::Save { path }
                } else {
                    Action::Load { path }
                }
            }
            other => return Err(ActionError::Malformed(format!("unknown op {other:?}"))),
        };
        Ok(action)
    }
}

fn item_field(value: &Value) -> Result<String, ActionError> {
    match value.get("item") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => {
            warn!("Invalid types: item must be str, got {}", type_name(other));
            Err(StockError::InvalidItemType(type_name(other).to_string()).into())
        }
        None => Err(ActionError::Malformed("missing \"item\" field".to_string())),
    }
}

fn qty_field(value: &Value, item: &str) -> Result<i64, ActionError> {
    let raw = value
        .get("qty")
        .ok_or_else(|| ActionError::Malformed("missing \"qty\" field".to_string()))?;
    if let Some(qty) = raw.as_i64() {
        return Ok(qty);
    }
    if raw.is_u64() {
        warn!("Quantity {} for {} is out of range", raw, item);
        return Err(StockError::QuantityOutOfRange {
            item: item.to_string(),
            raw: raw.to_string(),
        }
        .into());
    }
    warn!(
        "Invalid types: qty for {} must be int, got {}",
        item,
        type_name(raw)
    );
    Err(StockError::InvalidQuantityType {
        item: item.to_string(),
        found: type_name(raw).to_string(),
    }
    .into())
}

/// Apply one action to the store.
pub fn apply(
    store: &mut InventoryStore,
    action: Action,
    audit: &mut AuditLog,
) -> Result<Outcome, ActionError> {
    let outcome = match action {
        Action::Add { item, qty } => {
            let quantity = store.add(&item, qty, audit)?;
            Outcome::Added { item, quantity }
        }
        Action::Remove { item, qty } => {
            let removal = store.remove(&item, qty, audit)?;
            Outcome::Removed { item, removal }
        }
        Action::Quantity { item } => {
            let quantity = store.quantity(&item);
            Outcome::Quantity { item, quantity }
        }
        Action::LowStock { threshold } => Outcome::LowStock(store.low_stock(threshold)),
        Action::Report => {
            store.report();
            Outcome::Reported
        }
        Action::Save { path } => {
            store.save(&path)?;
            Outcome::Saved(path)
        }
        Action::Load { path } => {
            let items = store.load(&path)?;
            Outcome::Loaded { path, items }
        }
    };
    Ok(outcome)
}

/// The fixed demonstration sequence, saving to and reloading from `path`.
pub fn demo_actions(path: PathBuf, low_stock_threshold: u64) -> Vec<Action> {
    let add = |item: &str, qty| Action::Add {
        item: item.to_string(),
        qty,
    };
    let remove = |item: &str, qty| Action::Remove {
        item: item.to_string(),
        qty,
    };
    vec![
        add("apple", 10),
        add("banana", 2),
        add("orange", 1),
        remove("apple", 3),
        remove("grape", 1),
        Action::Quantity {
            item: "apple".to_string(),
        },
        Action::LowStock {
            threshold: low_stock_threshold,
        },
        Action::Save { path: path.clone() },
        Action::Load { path },
        Action::Report,
    ]
}
