//! services/viewer/src/adapters/memory.rs
//!
//! Process-local implementations of the storage ports. Used when persistence is
//! not wanted and as fakes in tests.

use async_trait::async_trait;
use pdf_reader_core::domain::Blob;
use pdf_reader_core::ports::{BlobStore, PortError, PortResult, StringStore};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::RwLock;

/// An in-memory `StringStore`.
#[derive(Debug, Default)]
pub struct MemoryStringStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStringStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| PortError::Unexpected(format!("string store lock poisoned: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StringStore for MemoryStringStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// An in-memory `BlobStore`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> PortResult<Option<Blob>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, blob: Blob) -> PortResult<()> {
        self.entries.write().await.insert(key.to_string(), blob);
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_store_overwrites_and_removes() {
        let store = MemoryStringStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn blob_store_round_trips_and_deleting_missing_keys_is_fine() {
        let store = MemoryBlobStore::new();
        store.put("a", Blob::new("image/png", vec![1u8, 2, 3])).await.unwrap();
        let blob = store.get("a").await.unwrap().unwrap();
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.data.as_ref(), &[1, 2, 3]);
        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert!(store.keys().await.is_empty());
    }
}
