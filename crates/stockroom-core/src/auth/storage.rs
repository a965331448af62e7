//! Key/value storage backing the session.
//!
//! `FileStorage` keeps entries in a JSON file so a login survives between
//! runs; `MemoryStorage` keeps them for the lifetime of the process.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for the data directory path
const APP_NAME: &str = "stockroom";

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub value: String,
    pub stored_at: DateTime<Utc>,
}

impl StoredItem {
    pub fn new(value: String) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
        }
    }
}

pub trait Storage: Send {
    fn get_item(&self, key: &str) -> Option<&StoredItem>;

    fn set_item(&mut self, key: &str, value: String) -> Result<()>;

    /// Remove an entry. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, StoredItem>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<&StoredItem> {
        self.items.get(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        self.items.insert(key.to_string(), StoredItem::new(value));
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage persisted to a JSON file, written through on every change
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, StoredItem>,
}

impl FileStorage {
    /// Open the storage file at `path`, starting empty if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse storage file {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = items.len(), "Storage opened");
        Ok(Self { path, items })
    }

    /// Open the storage file in the user's local data directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(STORAGE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `items` to disk. The in-memory map is only replaced by callers
    /// after this succeeds, so a failed write can be retried.
    fn write(&self, items: &BTreeMap<String, StoredItem>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write storage file {}", self.path.display()))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<&StoredItem> {
        self.items.get(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        let mut items = self.items.clone();
        items.insert(key.to_string(), StoredItem::new(value));
        self.write(&items)?;
        self.items = items;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if !self.items.contains_key(key) {
            return Ok(());
        }
        let mut items = self.items.clone();
        items.remove(key);
        self.write(&items)?;
        self.items = items;
        Ok(())
    }
}
