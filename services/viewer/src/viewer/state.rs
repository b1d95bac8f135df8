//! services/viewer/src/viewer/state.rs
//!
//! The injected collaborators of a viewer and the snapshot it renders from.

use pdf_reader_core::domain::{DisplayHandle, Source};
use pdf_reader_core::ports::{BlobStore, ContentHasher, DisplayHandles, StringStore};
use serde::Serialize;
use std::sync::Arc;

//=========================================================================================
// Services (shared backends handed to every viewer)
//=========================================================================================

/// The persistence backends and helpers a viewer is built from.
#[derive(Clone)]
pub struct Services {
    pub notes: Arc<dyn StringStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub display: Arc<dyn DisplayHandles>,
    pub hasher: Arc<dyn ContentHasher>,
}

//=========================================================================================
// Render status
//=========================================================================================

/// What the rendering collaborator has reported for the current source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageStatus {
    NoDocument,
    Loading,
    Ready { num_pages: u32 },
    /// Stays in place until a new source is chosen.
    Failed { message: String },
}

impl PageStatus {
    pub fn num_pages(&self) -> Option<u32> {
        match self {
            PageStatus::Ready { num_pages } => Some(*num_pages),
            _ => None,
        }
    }
}

//=========================================================================================
// ViewState (what the UI renders)
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceView {
    File { name: String, mime_type: String, size: usize },
    Url { url: String },
}

impl SourceView {
    pub fn from_source(source: &Source) -> Option<Self> {
        match source {
            Source::Empty => None,
            Source::File {
                bytes,
                name,
                mime_type,
            } => Some(SourceView::File {
                name: name.clone(),
                mime_type: mime_type.clone(),
                size: bytes.len(),
            }),
            Source::Url(url) => Some(SourceView::Url { url: url.clone() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub id: String,
    pub page: u32,
    pub caption: String,
    pub handle: DisplayHandle,
}

/// A point-in-time copy of everything the widget displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub source: Option<SourceView>,
    pub doc_id: String,
    pub status: PageStatus,
    pub page: u32,
    pub num_pages: Option<u32>,
    pub progress_percent: Option<u8>,
    pub scale: f64,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub page_note: String,
    pub global_note: String,
    pub error: Option<String>,
    pub images: Vec<ImageView>,
}
