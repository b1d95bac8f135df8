//! Shared setup for the viewer integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use viewer_lib::adapters::{MemoryBlobStore, MemoryDisplayHandles, MemoryStringStore, Sha256Hasher};
use viewer_lib::viewer::Services;

pub struct Fixture {
    pub services: Services,
    pub notes: Arc<MemoryStringStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub display: Arc<MemoryDisplayHandles>,
}

pub fn memory_fixture() -> Fixture {
    let notes = Arc::new(MemoryStringStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let display = Arc::new(MemoryDisplayHandles::new());
    let services = Services {
        notes: notes.clone(),
        blobs: blobs.clone(),
        display: display.clone(),
        hasher: Arc::new(Sha256Hasher),
    };
    Fixture {
        services,
        notes,
        blobs,
        display,
    }
}
