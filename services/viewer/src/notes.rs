//! services/viewer/src/notes.rs
//!
//! The notes/progress store: one JSON record per document holding the last
//! viewed page, a whole-document note and per-page notes.
//!
//! Every writer is a read-modify-write merge, so updating one field never
//! clobbers the others. An empty document id short-circuits all operations.

use pdf_reader_core::domain::{DocumentId, DocumentState};
use pdf_reader_core::ports::{PortError, PortResult, StringStore};
use std::sync::Arc;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "pdf-reader:state:";

pub struct NotesStore {
    backend: Arc<dyn StringStore>,
}

impl NotesStore {
    pub fn new(backend: Arc<dyn StringStore>) -> Self {
        Self { backend }
    }

    fn key(doc_id: &DocumentId) -> String {
        format!("{}{}", KEY_PREFIX, doc_id)
    }

    /// Reads the record for `doc_id`.
    ///
    /// Missing, unreadable and corrupted records all come back as `None`; a
    /// failure here is logged and never surfaced.
    pub fn load(&self, doc_id: &DocumentId) -> Option<DocumentState> {
        match self.read(doc_id) {
            Ok(state) => state,
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "notes: read failed");
                None
            }
        }
    }

    /// Backend failures are returned; a record that does not parse reads as
    /// absent.
    fn read(&self, doc_id: &DocumentId) -> PortResult<Option<DocumentState>> {
        if doc_id.is_empty() {
            return Ok(None);
        }
        let Some(raw) = self.backend.get(&Self::key(doc_id))? else {
            return Ok(None);
        };
        match serde_json::from_str::<DocumentState>(&raw) {
            Ok(mut state) => {
                state.last_page = state.last_page.max(1);
                Ok(Some(state))
            }
            Err(e) => {
                warn!(doc_id = %doc_id, error = %e, "notes: ignoring corrupted record");
                Ok(None)
            }
        }
    }

    /// Like `load`, but yields the default state for absent records.
    pub fn load_or_default(&self, doc_id: &DocumentId) -> DocumentState {
        self.load(doc_id).unwrap_or_default()
    }

    pub fn set_last_page(&self, doc_id: &DocumentId, page: u32) -> PortResult<()> {
        self.update(doc_id, |state| state.last_page = page.max(1))
    }

    pub fn set_page_note(&self, doc_id: &DocumentId, page: u32, text: &str) -> PortResult<()> {
        self.update(doc_id, |state| state.set_page_note(page, text))
    }

    pub fn set_global_note(&self, doc_id: &DocumentId, text: &str) -> PortResult<()> {
        self.update(doc_id, |state| state.global_note = text.to_string())
    }

    fn update<F>(&self, doc_id: &DocumentId, apply: F) -> PortResult<()>
    where
        F: FnOnce(&mut DocumentState),
    {
        if doc_id.is_empty() {
            return Ok(());
        }
        let mut state = self.read(doc_id)?.unwrap_or_default();
        apply(&mut state);
        let raw = serde_json::to_string(&state)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!(doc_id = %doc_id, last_page = state.last_page, "notes: write");
        self.backend.set(&Self::key(doc_id), &raw)
    }
}
