//! services/viewer/src/bin/viewer.rs

use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use viewer_lib::{
    adapters::{
        FsBlobStore, JsonFileStringStore, MemoryBlobStore, MemoryDisplayHandles,
        MemoryStringStore, Sha256Hasher,
    },
    bridge,
    config::{Config, StorageKind},
    error::ViewerError,
    viewer::Services,
};

#[tokio::main]
async fn main() -> Result<(), ViewerError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    // Stdout carries the bridge protocol, so logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(?config, "Configuration loaded.");

    // --- 2. Initialize Storage Adapters ---
    let services = match config.storage {
        StorageKind::File => {
            info!(data_dir = %config.data_dir.display(), "Using file-backed storage.");
            Services {
                notes: Arc::new(JsonFileStringStore::open(config.notes_file())),
                blobs: Arc::new(FsBlobStore::new(config.blob_dir())),
                display: Arc::new(MemoryDisplayHandles::new()),
                hasher: Arc::new(Sha256Hasher),
            }
        }
        StorageKind::Memory => {
            info!("Using in-memory storage; nothing will be persisted.");
            Services {
                notes: Arc::new(MemoryStringStore::new()),
                blobs: Arc::new(MemoryBlobStore::new()),
                display: Arc::new(MemoryDisplayHandles::new()),
                hasher: Arc::new(Sha256Hasher),
            }
        }
    };

    // --- 3. Serve the Host over Stdin/Stdout ---
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    bridge::run(&services, stdin, stdout).await?;

    info!("Host disconnected. Shutting down.");
    Ok(())
}
