//! crates/pdf_reader_core/src/ports.rs
//!
//! Defines the service contracts (traits) the reader's logic depends on.
//! Storage backends, display handles and hashing are injected through these
//! traits so the core never touches ambient global state.

use crate::domain::{Blob, DisplayHandle};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Synchronous string-keyed key-value storage, backing notes and progress.
pub trait StringStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&self, key: &str) -> PortResult<()>;
}

/// Asynchronous key-value storage for arbitrary binary values.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<Blob>>;

    async fn put(&self, key: &str, blob: Blob) -> PortResult<()>;

    /// Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> PortResult<()>;
}

/// Issues temporary in-memory handles that a renderer can use to show a payload.
pub trait DisplayHandles: Send + Sync {
    fn create(&self, blob: &Blob) -> DisplayHandle;

    fn resolve(&self, handle: &DisplayHandle) -> Option<Blob>;

    /// Releasing an unknown handle is a no-op.
    fn release(&self, handle: &DisplayHandle);
}

/// Produces a lowercase hexadecimal digest of a byte slice.
pub trait ContentHasher: Send + Sync {
    fn digest(&self, bytes: &[u8]) -> PortResult<String>;
}
