//! services/viewer/src/adapters/fs_blob.rs
//!
//! A `BlobStore` that keeps one file per key under a base directory.
//!
//! File layout: `{base}/{hex(key)}.blob`, holding the MIME type, a newline, then
//! the raw bytes. Writes go to a temp file first and are renamed into place.

use async_trait::async_trait;
use bytes::Bytes;
use pdf_reader_core::domain::Blob;
use pdf_reader_core::ports::{BlobStore, PortError, PortResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.blob", hex::encode(key)))
    }

    fn encode(blob: &Blob) -> PortResult<Vec<u8>> {
        if blob.mime_type.contains('\n') {
            return Err(PortError::Unexpected(format!(
                "MIME type {:?} contains a newline",
                blob.mime_type
            )));
        }
        let mut out = Vec::with_capacity(blob.mime_type.len() + 1 + blob.len());
        out.extend_from_slice(blob.mime_type.as_bytes());
        out.push(b'\n');
        out.extend_from_slice(&blob.data);
        Ok(out)
    }

    fn decode(key: &str, raw: Vec<u8>) -> PortResult<Blob> {
        let split = raw
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| PortError::Unexpected(format!("blob {} has no MIME header", key)))?;
        let mime_type = std::str::from_utf8(&raw[..split])
            .map_err(|e| PortError::Unexpected(format!("blob {} has a bad MIME header: {}", key, e)))?
            .to_string();
        let data = Bytes::from(raw).slice(split + 1..);
        Ok(Blob { mime_type, data })
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &str) -> PortResult<Option<Blob>> {
        let full_path = self.full_path(key);
        match fs::read(&full_path).await {
            Ok(raw) => Self::decode(key, raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unavailable(format!("read({:?}): {}", full_path, e))),
        }
    }

    async fn put(&self, key: &str, blob: Blob) -> PortResult<()> {
        let full_path = self.full_path(key);
        debug!(key = %key, full_path = %full_path.display(), size = blob.len(), "fs_blob: put");

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            PortError::Unavailable(format!("create_dir_all({:?}): {}", self.base_path, e))
        })?;

        let encoded = Self::encode(&blob)?;
        let tmp = full_path.with_extension("blob.tmp");
        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| PortError::Unavailable(format!("create({:?}): {}", tmp, e)))?;
        file.write_all(&encoded)
            .await
            .map_err(|e| PortError::Unavailable(format!("write({:?}): {}", tmp, e)))?;
        file.sync_all()
            .await
            .map_err(|e| PortError::Unavailable(format!("sync({:?}): {}", tmp, e)))?;
        drop(file);

        fs::rename(&tmp, &full_path)
            .await
            .map_err(|e| PortError::Unavailable(format!("rename({:?}): {}", tmp, e)))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> PortResult<()> {
        let full_path = self.full_path(key);
        debug!(key = %key, full_path = %full_path.display(), "fs_blob: delete");
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unavailable(format!("remove_file({:?}): {}", full_path, e))),
        }
    }
}
