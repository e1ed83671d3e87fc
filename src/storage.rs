//! Dataset storage addressed by logical name.
//!
//! The pipeline only reads and writes whole tables of serde rows; where and
//! how they are kept is up to the [`DatasetStore`] implementation.

use crate::error::{EpochError, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Read/write access to named datasets.
pub trait DatasetStore {
    /// Read all rows of dataset `name`.
    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>>;

    /// Replace dataset `name` with `rows`.
    fn write<T: Serialize>(&mut self, name: &str, rows: &[T]) -> Result<()>;

    /// Whether dataset `name` exists.
    fn contains(&self, name: &str) -> bool;
}

fn not_found(name: &str) -> EpochError {
    EpochError::Storage(format!("dataset '{name}' not found"))
}

/// In-memory store holding datasets as JSON values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    datasets: BTreeMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }
}

impl DatasetStore for MemoryStore {
    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let value = self.datasets.get(name).ok_or_else(|| not_found(name))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    fn write<T: Serialize>(&mut self, name: &str, rows: &[T]) -> Result<()> {
        self.datasets
            .insert(name.to_string(), serde_json::to_value(rows)?);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }
}

/// Directory of pretty-printed JSON files, one `<name>.json` per dataset.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| EpochError::Storage(format!("{}: {e}", root.display())))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing dataset `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl DatasetStore for JsonDirStore {
    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.path_of(name);
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => not_found(name),
            _ => EpochError::Storage(format!("{}: {e}", path.display())),
        })?;
        debug!("read dataset '{name}' from {}", path.display());
        Ok(serde_json::from_str(&text)?)
    }

    fn write<T: Serialize>(&mut self, name: &str, rows: &[T]) -> Result<()> {
        let path = self.path_of(name);
        let mut text = serde_json::to_string_pretty(rows)?;
        text.push('\n');
        std::fs::write(&path, text)
            .map_err(|e| EpochError::Storage(format!("{}: {e}", path.display())))?;
        debug!("wrote {} rows to dataset '{name}' at {}", rows.len(), path.display());
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        key: String,
        value: f64,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                key: "a".to_string(),
                value: 0.25,
            },
            Row {
                key: "b".to_string(),
                value: 1.0,
            },
        ]
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(!store.contains("rows"));
        store.write("rows", &rows()).unwrap();

        assert!(store.contains("rows"));
        assert_eq!(store.read::<Row>("rows").unwrap(), rows());
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["rows"]);
    }

    #[test]
    fn memory_store_missing_dataset() {
        let store = MemoryStore::new();
        let err = store.read::<Row>("nope").unwrap_err();
        assert_eq!(err, EpochError::Storage("dataset 'nope' not found".to_string()));
    }

    #[test]
    fn json_dir_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(dir.path().join("data")).unwrap();
        store.write("rows", &rows()).unwrap();

        assert!(store.path_of("rows").is_file());
        assert_eq!(store.read::<Row>("rows").unwrap(), rows());
    }

    #[test]
    fn json_dir_store_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        assert!(!store.contains("rows"));
        assert!(matches!(store.read::<Row>("rows"), Err(EpochError::Storage(_))));
    }
}
