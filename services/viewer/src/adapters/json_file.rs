//! services/viewer/src/adapters/json_file.rs
//!
//! A `StringStore` persisted as a single JSON object on disk. The whole map is
//! kept in memory and rewritten on every change, so reads never touch the disk.

use pdf_reader_core::ports::{PortError, PortResult, StringStore};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub struct JsonFileStringStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStringStore {
    /// Opens the store at `path`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupted file is
    /// logged and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "json_file: discarding unreadable store");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "json_file: opened");
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, String> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| PortError::Unexpected(format!("json store lock poisoned: {}", e)))
    }

    /// Writes to a sibling temp file, then renames over the target.
    fn save(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PortError::Unavailable(format!("create_dir_all({:?}): {}", parent, e))
            })?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .map_err(|e| PortError::Unavailable(format!("write({:?}): {}", tmp, e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| PortError::Unavailable(format!("rename({:?}): {}", tmp, e)))?;
        Ok(())
    }
}

impl StringStore for JsonFileStringStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self.lock()?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.save(&entries) {
            // Keep memory in line with disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self.lock()?;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.save(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.json");

        let store = JsonFileStringStore::open(&path);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        let reopened = JsonFileStringStore::open(&path);
        assert_eq!(reopened.get("a").unwrap(), None);
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupted_file_opens_empty_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStringStore::open(&path);
        assert_eq!(store.get("anything").unwrap(), None);
        store.set("k", "v").unwrap();

        let reopened = JsonFileStringStore::open(&path);
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }
}
