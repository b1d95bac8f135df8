//! services/viewer/src/images.rs
//!
//! The image attachment store: per document, an ordered (newest-first) list of
//! attachment metadata plus one payload entry per attachment.
//!
//! Metadata and payload are separate backend entries. `add` writes the payload
//! first and rolls it back if the metadata write fails; `remove` drops the
//! metadata entry first so the list never points at a deleted payload.
//!
//! The metadata list is rewritten whole on every change without any version
//! check. Two concurrent writers for the same document can lose an update;
//! with a single local user that is accepted.

use crate::error::ViewerError;
use bytes::Bytes;
use pdf_reader_core::domain::{Blob, DisplayHandle, DocumentId, ImageAttachment};
use pdf_reader_core::ports::{BlobStore, ContentHasher, DisplayHandles, PortError, PortResult};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const LIST_PREFIX: &str = "pdf-reader:images:";
const PAYLOAD_PREFIX: &str = "pdf-reader:image:";
const LIST_MIME: &str = "application/json";

/// An attachment together with a live display handle for its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedImage {
    pub attachment: ImageAttachment,
    pub handle: DisplayHandle,
}

pub struct ImageStore {
    backend: Arc<dyn BlobStore>,
    handles: Arc<dyn DisplayHandles>,
    hasher: Arc<dyn ContentHasher>,
}

impl ImageStore {
    pub fn new(
        backend: Arc<dyn BlobStore>,
        handles: Arc<dyn DisplayHandles>,
        hasher: Arc<dyn ContentHasher>,
    ) -> Self {
        Self {
            backend,
            handles,
            hasher,
        }
    }

    fn list_key(doc_id: &DocumentId) -> String {
        format!("{}{}", LIST_PREFIX, doc_id)
    }

    fn payload_key(doc_id: &DocumentId, id: &str) -> String {
        format!("{}{}:{}", PAYLOAD_PREFIX, doc_id, id)
    }

    /// Attachment metadata for `doc_id`, newest first.
    ///
    /// Missing or unreadable lists come back empty.
    pub async fn list(&self, doc_id: &DocumentId) -> Vec<ImageAttachment> {
        if doc_id.is_empty() {
            return Vec::new();
        }
        match self.read_list(doc_id).await {
            Ok(list) => list,
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "images: list unreadable, showing none");
                Vec::new()
            }
        }
    }

    /// Backend failures are returned; a list that does not parse reads as empty.
    async fn read_list(&self, doc_id: &DocumentId) -> PortResult<Vec<ImageAttachment>> {
        let Some(blob) = self.backend.get(&Self::list_key(doc_id)).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&blob.data) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "images: ignoring corrupted list");
                Ok(Vec::new())
            }
        }
    }

    async fn write_list(&self, doc_id: &DocumentId, list: &[ImageAttachment]) -> PortResult<()> {
        let raw = serde_json::to_vec(list).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.backend
            .put(&Self::list_key(doc_id), Blob::new(LIST_MIME, raw))
            .await
    }

    /// Loads every attachment for `doc_id` and issues a display handle for each.
    ///
    /// Entries whose payload has gone missing are skipped.
    pub async fn load_with_handles(&self, doc_id: &DocumentId) -> Vec<AttachedImage> {
        let mut loaded = Vec::new();
        for attachment in self.list(doc_id).await {
            let key = Self::payload_key(doc_id, &attachment.id);
            match self.backend.get(&key).await {
                Ok(Some(blob)) => {
                    let handle = self.handles.create(&blob);
                    loaded.push(AttachedImage { attachment, handle });
                }
                Ok(None) => {
                    warn!(doc_id = %doc_id, id = %attachment.id, "images: payload missing, skipping");
                }
                Err(e) => {
                    warn!(doc_id = %doc_id, id = %attachment.id, error = %e, "images: payload unreadable, skipping");
                }
            }
        }
        loaded
    }

    /// Persists a new attachment and returns it with a fresh display handle.
    ///
    /// Nothing is left behind in the backend if this returns an error.
    pub async fn add(
        &self,
        doc_id: &DocumentId,
        payload: Bytes,
        mime_type: &str,
        page: u32,
        caption: &str,
    ) -> Result<AttachedImage, ViewerError> {
        if doc_id.is_empty() {
            return Err(ViewerError::NoDocument);
        }

        let mut list = self.read_list(doc_id).await?;
        let id = self.new_attachment_id(&payload, &list);
        let attachment = ImageAttachment {
            id: id.clone(),
            page,
            caption: caption.trim().to_string(),
        };
        let blob = Blob::new(mime_type, payload);
        let payload_key = Self::payload_key(doc_id, &id);

        self.backend.put(&payload_key, blob.clone()).await?;

        list.insert(0, attachment.clone());
        if let Err(e) = self.write_list(doc_id, &list).await {
            if let Err(cleanup) = self.backend.delete(&payload_key).await {
                warn!(doc_id = %doc_id, id = %id, error = %cleanup, "images: rollback of payload failed");
            }
            return Err(e.into());
        }

        info!(doc_id = %doc_id, id = %id, page, size = blob.len(), "images: attachment added");
        let handle = self.handles.create(&blob);
        Ok(AttachedImage { attachment, handle })
    }

    /// `<content hash>-<unix millis>`, bumped forward if that id is already taken.
    fn new_attachment_id(&self, payload: &[u8], existing: &[ImageAttachment]) -> String {
        let digest = match self.hasher.digest(payload) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(error = %e, "images: hashing failed, using a random id prefix");
                Uuid::new_v4().simple().to_string()
            }
        };
        let mut stamp = chrono::Utc::now().timestamp_millis();
        loop {
            let candidate = format!("{}-{}", digest, stamp);
            if !existing.iter().any(|a| a.id == candidate) {
                return candidate;
            }
            stamp += 1;
        }
    }

    /// Deletes an attachment's metadata and payload. Returns `false` when no
    /// attachment with that id exists, which is not an error.
    pub async fn remove(&self, doc_id: &DocumentId, id: &str) -> Result<bool, ViewerError> {
        if doc_id.is_empty() {
            return Ok(false);
        }
        let mut list = self.read_list(doc_id).await?;
        let before = list.len();
        list.retain(|a| a.id != id);
        if list.len() == before {
            debug!(doc_id = %doc_id, id = %id, "images: remove of unknown id ignored");
            return Ok(false);
        }

        self.write_list(doc_id, &list).await?;
        if let Err(e) = self.backend.delete(&Self::payload_key(doc_id, id)).await {
            warn!(doc_id = %doc_id, id = %id, error = %e, "images: payload left orphaned");
        }
        info!(doc_id = %doc_id, id = %id, "images: attachment removed");
        Ok(true)
    }

    pub fn release(&self, handle: &DisplayHandle) {
        self.handles.release(handle);
    }
}
