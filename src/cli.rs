//! # Command Runner
//!
//! Turns a parsed subcommand into store actions against the stock file.
//! Every command loads the file first; commands that write refuse to touch
//! a file they couldn't read, so a corrupt inventory is never overwritten.
//!
//! `run()` returns `true` when every requested operation succeeded. The
//! binary maps that onto the process exit code.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use log::error;
use serde_json::Value;

use crate::core::action::{RequestDefaults, demo_actions};
use crate::core::config::ResolvedConfig;
use crate::core::{
    Action, ActionError, AuditLog, InventoryStore, Outcome, PersistError, Removal, apply,
};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add stock for an item
    Add {
        item: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Remove stock for an item
    Remove {
        item: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    /// Show the stocked quantity of an item
    Qty { item: String },
    /// List items below the low-stock threshold
    Low {
        #[arg(short, long)]
        threshold: Option<u64>,
    },
    /// Print every item and its quantity
    Report,
    /// Apply a JSON array of requests, e.g. [{"op": "add", "item": "apple", "qty": 3}]
    Batch { requests: PathBuf },
    /// Run the built-in demonstration sequence
    Demo,
}

impl Command {
    /// True for commands that save the stock file afterwards.
    pub fn writes(&self) -> bool {
        matches!(
            self,
            Command::Add { .. } | Command::Remove { .. } | Command::Batch { .. } | Command::Demo
        )
    }

    /// Threshold given on the command line, if any.
    pub fn threshold(&self) -> Option<u64> {
        match self {
            Command::Low { threshold } => *threshold,
            _ => None,
        }
    }
}

pub fn run(command: Command, config: &ResolvedConfig, audit: &mut AuditLog) -> bool {
    let path = config.data_file.as_path();
    let writes = command.writes();
    let defaults = RequestDefaults {
        low_stock_threshold: config.low_stock_threshold,
        data_file: config.data_file.clone(),
    };

    let mut ok = true;
    let actions = match command {
        Command::Add { item, qty } => vec![Action::Add { item, qty }],
        Command::Remove { item, qty } => vec![Action::Remove { item, qty }],
        Command::Qty { item } => vec![Action::Quantity { item }],
        Command::Low { .. } => vec![Action::LowStock {
            threshold: config.low_stock_threshold,
        }],
        Command::Report => vec![Action::Report],
        Command::Batch { requests } => match read_requests(&requests, &defaults) {
            Some((actions, rejected)) => {
                ok = rejected == 0;
                actions
            }
            None => return false,
        },
        // The demo saves and reloads on its own.
        Command::Demo => demo_actions(path.to_path_buf(), config.low_stock_threshold),
    };

    let mut store = InventoryStore::new();
    if !open_store(&mut store, path, writes) {
        return false;
    }

    for action in actions {
        ok &= apply_and_print(&mut store, action, audit);
    }

    if writes && store.save(path).is_err() {
        eprintln!("Failed to save {}", path.display());
        return false;
    }
    ok
}

/// Load the stock file. A missing file starts an empty inventory; a file
/// that can't be read is fatal for commands that would overwrite it.
fn open_store(store: &mut InventoryStore, path: &Path, writes: bool) -> bool {
    match store.load(path) {
        Ok(_) | Err(PersistError::NotFound(_)) => true,
        Err(e) if writes => {
            eprintln!("Error: {e}; refusing to overwrite it");
            false
        }
        Err(e) => {
            eprintln!("Warning: {e}; showing an empty inventory");
            true
        }
    }
}

/// Parse a batch file into validated actions. Invalid entries are reported
/// and skipped; the second value counts them.
fn read_requests(path: &Path, defaults: &RequestDefaults) -> Option<(Vec<Action>, usize)> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Failed to read batch file {}: {}", path.display(), e);
            eprintln!("Error: cannot read {}: {e}", path.display());
            return None;
        }
    };
    let requests: Vec<Value> = match serde_json::from_str(&raw) {
        Ok(requests) => requests,
        Err(e) => {
            error!("Invalid JSON in batch file {}: {}", path.display(), e);
            eprintln!("Error: {} is not a JSON array: {e}", path.display());
            return None;
        }
    };

    let mut actions = Vec::with_capacity(requests.len());
    let mut rejected = 0;
    for (i, request) in requests.iter().enumerate() {
        match Action::from_value(request, defaults) {
            Ok(action) => actions.push(action),
            Err(e) => {
                eprintln!("Skipping request #{}: {e}", i + 1);
                rejected += 1;
            }
        }
    }
    Some((actions, rejected))
}

fn apply_and_print(store: &mut InventoryStore, action: Action, audit: &mut AuditLog) -> bool {
    match apply(store, action, audit) {
        Ok(outcome) => {
            if let Some(line) = describe(&outcome) {
                println!("{line}");
            }
            true
        }
        Err(ActionError::Persist(PersistError::NotFound(path))) => {
            eprintln!("Warning: {} not found; inventory is now empty", path.display());
            true
        }
        Err(e) => {
            eprintln!("Error: {e}");
            false
        }
    }
}

fn describe(outcome: &Outcome) -> Option<String> {
    let line = match outcome {
        Outcome::Added { item, quantity } => format!("{item}: {quantity} in stock"),
        Outcome::Removed { item, removal } => match removal {
            Removal::Reduced { remaining } => format!("{item}: {remaining} in stock"),
            Removal::Depleted => format!("{item}: out of stock"),
            Removal::Missing => format!("{item}: not stocked, nothing removed"),
        },
        Outcome::Quantity { item, quantity } => format!("{item}: {quantity}"),
        Outcome::LowStock(items) => format!("Low items: {items:?}"),
        Outcome::Reported => return None,
        Outcome::Saved(path) => format!("Saved {}", path.display()),
        Outcome::Loaded { path, items } => format!("Loaded {items} items from {}", path.display()),
    };
    Some(line)
}
