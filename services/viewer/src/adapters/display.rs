//! services/viewer/src/adapters/display.rs
//!
//! An in-memory registry of display handles, the equivalent of object URLs.
//! Each live handle pins a copy of its payload until released.

use pdf_reader_core::domain::{Blob, DisplayHandle};
use pdf_reader_core::ports::DisplayHandles;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryDisplayHandles {
    live: Mutex<HashMap<DisplayHandle, Blob>>,
}

impl MemoryDisplayHandles {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<DisplayHandle, Blob>> {
        // The map stays consistent even if a holder panicked.
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of handles created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live().len()
    }
}

impl DisplayHandles for MemoryDisplayHandles {
    fn create(&self, blob: &Blob) -> DisplayHandle {
        let handle = DisplayHandle::new(format!("blob:{}", Uuid::new_v4()));
        debug!(handle = %handle, size = blob.len(), "display: create");
        self.live().insert(handle.clone(), blob.clone());
        handle
    }

    fn resolve(&self, handle: &DisplayHandle) -> Option<Blob> {
        self.live().get(handle).cloned()
    }

    fn release(&self, handle: &DisplayHandle) {
        if self.live().remove(handle).is_some() {
            debug!(handle = %handle, "display: release");
        }
    }
}
