use std::fs;

use serde_json::json;
use stockroom::core::RequestDefaults;
use stockroom::core::action::demo_actions;
use stockroom::{
    Action, ActionError, AuditLog, InventoryStore, Outcome, PersistError, Removal, StockError,
    apply,
};
use tempfile::tempdir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Applies raw JSON requests the way a batch file would, collecting results.
fn apply_raw(
    store: &mut InventoryStore,
    audit: &mut AuditLog,
    requests: &[serde_json::Value],
) -> Vec<Result<Outcome, ActionError>> {
    let defaults = RequestDefaults::default();
    requests
        .iter()
        .map(|r| Action::from_value(r, &defaults).and_then(|a| apply(store, a, audit)))
        .collect()
}

// ============================================================================
// Store Behaviour
// ============================================================================

#[test]
fn test_add_then_remove_reflects_running_total() {
    let mut store = InventoryStore::new();
    let mut audit = AuditLog::new();

    store.add("apple", 10, &mut audit).unwrap();
    store.add("apple", 4, &mut audit).unwrap();
    store.remove("apple", 6, &mut audit).unwrap();

    assert_eq!(store.quantity("apple"), 8);
    assert_eq!(audit.len(), 3);
    assert!(audit.lines()[0].ends_with(": Added 10 of apple"));
    assert!(audit.lines()[2].ends_with(": Removed 6 of apple"));
}

#[test]
fn test_non_text_item_never_changes_table() {
    let mut store = InventoryStore::new();
    let mut audit = AuditLog::new();

    let results = apply_raw(
        &mut store,
        &mut audit,
        &[json!({"op": "add", "item": 123, "qty": 1})],
    );

    assert!(matches!(
        results[0],
        Err(ActionError::Stock(StockError::InvalidItemType(_)))
    ));
    assert!(store.is_empty());
    assert!(audit.is_empty());
}

#[test]
fn test_batch_keeps_valid_requests_and_rejects_bad_ones() {
    let mut store = InventoryStore::new();
    let mut audit = AuditLog::new();

    let results = apply_raw(
        &mut store,
        &mut audit,
        &[
            json!({"op": "add", "item": "banana", "qty": 2}),
            json!({"op": "add", "item": "mango", "qty": "10"}),
            json!({"op": "add", "item": "mango", "qty": 10}),
            json!({"op": "add", "item": "banana", "qty": -1}),
            json!({"op": "remove", "item": "ghost", "qty": 1}),
        ],
    );

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert!(results[3].is_err());
    assert!(matches!(
        results[4],
        Ok(Outcome::Removed {
            removal: Removal::Missing,
            ..
        })
    ));
    assert_eq!(store.low_stock(5), vec!["banana".to_string()]);
    assert_eq!(store.quantity("banana"), 2);
}

#[test]
fn test_depleted_item_leaves_table() {
    let mut store = InventoryStore::new();
    let mut audit = AuditLog::new();

    store.add("apple", 10, &mut audit).unwrap();
    store.remove("apple", 10, &mut audit).unwrap();

    assert_eq!(store.quantity("apple"), 0);
    assert!(!store.contains("apple"));
    assert!(store.low_stock(5).is_empty());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_save_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventory.json");
    let mut audit = AuditLog::new();

    let mut store = InventoryStore::new();
    store.add("apple", 7, &mut audit).unwrap();
    store.add("banana", 2, &mut audit).unwrap();
    store.save(&path).unwrap();

    let mut reloaded = InventoryStore::new();
    reloaded.load(&path).unwrap();
    assert_eq!(reloaded, store);

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"apple": 7, "banana": 2}));
}

#[test]
fn test_load_nonexistent_gives_empty_table() {
    let dir = tempdir().unwrap();
    let mut store: InventoryStore = [("apple", 3u64)].into_iter().collect();

    let result = store.load(&dir.path().join("nonexistent.json"));

    assert!(matches!(result, Err(PersistError::NotFound(_))));
    assert!(store.is_empty());
}

#[test]
fn test_load_corrupt_file_gives_empty_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventory.json");
    fs::write(&path, r#"{"apple": 3, "pear": 1.5}"#).unwrap();
    let mut store: InventoryStore = [("kiwi", 9u64)].into_iter().collect();

    assert!(matches!(store.load(&path), Err(PersistError::Decode { .. })));
    assert!(store.is_empty());
}

#[test]
fn test_load_empty_item_name_gives_empty_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventory.json");
    fs::write(&path, r#"{"": 3}"#).unwrap();
    let mut store = InventoryStore::new();
    let mut audit = AuditLog::new();

    assert!(matches!(store.load(&path), Err(PersistError::Decode { .. })));
    assert!(!store.contains(""));
    assert_eq!(store.add("", 1, &mut audit), Err(StockError::EmptyName));
}

#[test]
fn test_demo_sequence_persists_final_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventory.json");
    let mut store = InventoryStore::new();
    let mut audit = AuditLog::new();

    for action in demo_actions(path.clone(), 5) {
        apply(&mut store, action, &mut audit).unwrap();
    }

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"apple": 7, "banana": 2, "orange": 1}));
}
