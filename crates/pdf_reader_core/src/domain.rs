//! crates/pdf_reader_core/src/domain.rs
//!
//! Defines the pure, core data structures for the PDF reader.
//! These structs are independent of any storage backend or UI toolkit.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The document the user has selected, replaced wholesale on every new selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    Empty,
    File {
        bytes: Bytes,
        name: String,
        mime_type: String,
    },
    Url(String),
}

impl Source {
    pub fn is_empty(&self) -> bool {
        matches!(self, Source::Empty)
    }

    /// A short human-readable label: the file name or the URL.
    pub fn label(&self) -> Option<&str> {
        match self {
            Source::Empty => None,
            Source::File { name, .. } => Some(name),
            Source::Url(url) => Some(url),
        }
    }
}

/// Stable key naming a document's persisted state.
///
/// An empty id means "no active document" and every store skips it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn for_url(url: &str) -> Self {
        Self(format!("url:{url}"))
    }

    pub fn for_content_hash(hex_digest: &str) -> Self {
        Self(format!("file:{hex_digest}"))
    }

    /// Weak fallback used when the content cannot be hashed.
    /// Two different files that share a name collide under this id.
    pub fn for_file_name(name: &str) -> Self {
        Self(format!("file:{name}"))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted reading position and notes for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentState {
    pub last_page: u32,
    pub global_note: String,
    /// Keyed by the page number rendered as a decimal string.
    pub page_notes: BTreeMap<String, String>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            last_page: 1,
            global_note: String::new(),
            page_notes: BTreeMap::new(),
        }
    }
}

impl DocumentState {
    pub fn page_note(&self, page: u32) -> &str {
        self.page_notes
            .get(&page.to_string())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_page_note(&mut self, page: u32, text: &str) {
        self.page_notes.insert(page.to_string(), text.to_string());
    }
}

/// Metadata for a captioned image attached to one page of a document.
/// The image bytes live in a separate store entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub id: String,
    pub page: u32,
    pub caption: String,
}

/// A typed binary payload, the unit the blob store persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub data: Bytes,
}

impl Blob {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A temporary reference usable to render a payload. Must be released explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayHandle(String);

impl DisplayHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
