//! # Stock File Persistence
//!
//! Reads and writes the stock table as a single JSON object mapping item
//! names to quantities:
//!
//! ```json
//! {
//!     "apple": 7,
//!     "banana": 2
//! }
//! ```
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) so a crash never
//! leaves a half-written file behind.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::Error as _;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Default location of the stock file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "inventory.json";

pub type StockTable = BTreeMap<String, u64>;

#[derive(Debug)]
pub enum PersistError {
    /// The stock file does not exist yet.
    NotFound(PathBuf),
    /// Reading or writing failed for any other reason.
    Io { path: PathBuf, source: io::Error },
    /// The file exists but isn't an object of non-empty item name →
    /// non-negative integer.
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::NotFound(path) => write!(f, "file not found: {}", path.display()),
            PersistError::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            PersistError::Decode { path, source } => {
                write!(f, "invalid JSON in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::NotFound(_) => None,
            PersistError::Io { source, .. } => Some(source),
            PersistError::Decode { source, .. } => Some(source),
        }
    }
}

/// Read the stock table from `path`.
pub fn read_table(path: &Path) -> Result<StockTable, PersistError> {
    let json = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PersistError::NotFound(path.to_path_buf()),
        _ => PersistError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let decode_err = |e: serde_json::Error| PersistError::Decode {
        path: path.to_path_buf(),
        source: e,
    };
    let table: StockTable = serde_json::from_str(&json).map_err(decode_err)?;
    if table.contains_key("") {
        return Err(decode_err(serde_json::Error::custom(
            "item names must not be empty",
        )));
    }
    Ok(table)
}

/// Scratch file used while writing `path`: the full file name plus `.tmp`,
/// so `inventory.json` stages through `inventory.json.tmp`.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

/// Atomically write `table` to `path` as 4-space indented JSON.
pub fn write_table(path: &Path, table: &StockTable) -> Result<(), PersistError> {
    let io_err = |e: io::Error| PersistError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let json = to_pretty_json(table).map_err(io_err)?;
    let tmp_path = staging_path(path);
    fs::write(&tmp_path, json).map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }
    Ok(())
}

fn to_pretty_json<T: Serialize>(data: &T) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut ser)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_uses_four_space_indent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.json");
        let table = StockTable::from([("apple".to_string(), 7), ("banana".to_string(), 2)]);

        write_table(&path, &table).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"apple\": 7,\n    \"banana\": 2\n}\n");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_write_leaves_sibling_tmp_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        let sibling = dir.path().join("inventory.tmp");
        fs::write(&sibling, "unrelated notes").unwrap();

        write_table(&path, &StockTable::from([("apple".to_string(), 1)])).unwrap();

        assert_eq!(fs::read_to_string(&sibling).unwrap(), "unrelated notes");
        assert_eq!(staging_path(&path), dir.path().join("inventory.json.tmp"));
    }

    #[test]
    fn test_read_rejects_empty_item_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.json");
        fs::write(&path, r#"{"": 3, "apple": 1}"#).unwrap();
        assert!(matches!(read_table(&path), Err(PersistError::Decode { .. })));
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = read_table(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PersistError::NotFound(_)));
    }

    #[test]
    fn test_read_rejects_negative_quantity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.json");
        fs::write(&path, r#"{"apple": -3}"#).unwrap();
        assert!(matches!(read_table(&path), Err(PersistError::Decode { .. })));
    }

    #[test]
    fn test_read_rejects_non_integer_quantity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.json");
        fs::write(&path, r#"{"apple": "ten"}"#).unwrap();
        assert!(matches!(read_table(&path), Err(PersistError::Decode { .. })));
    }

    #[test]
    fn test_read_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(read_table(&path), Err(PersistError::Decode { .. })));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("stock.json");
        let err = write_table(&path, &StockTable::new()).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
