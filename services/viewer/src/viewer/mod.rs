//! services/viewer/src/viewer/mod.rs
//!
//! The viewer controller. It owns the selected source, the page and zoom state
//! and the in-memory mirrors of the persisted notes and image attachments.
//!
//! Selecting a source is split in two steps: `select_source` resets page-local
//! state and returns a `PendingIdentity`; once that resolves, `apply_identity`
//! loads the persisted state for the new document. A resolution that belongs to
//! a superseded selection is discarded there.

pub mod navigation;
pub mod state;

use crate::error::ViewerError;
use crate::identity::{IdentityResolver, PendingIdentity, ResolvedIdentity};
use crate::images::{AttachedImage, ImageStore};
use crate::notes::NotesStore;
use bytes::Bytes;
use pdf_reader_core::domain::{DocumentId, DocumentState, Source};
use tracing::{debug, info, warn};

pub use state::{ImageView, PageStatus, Services, SourceView, ViewState};

pub struct Viewer {
    source: Source,
    doc_id: DocumentId,
    resolver: IdentityResolver,
    notes: NotesStore,
    images: ImageStore,
    status: PageStatus,
    page: u32,
    scale: f64,
    error_message: Option<String>,
    /// Mirror of the persisted record, loaded once per identity change.
    document: DocumentState,
    attachments: Vec<AttachedImage>,
}

impl Viewer {
    pub fn new(services: &Services) -> Self {
        Self {
            source: Source::Empty,
            doc_id: DocumentId::empty(),
            resolver: IdentityResolver::new(services.hasher.clone()),
            notes: NotesStore::new(services.notes.clone()),
            images: ImageStore::new(
                services.blobs.clone(),
                services.display.clone(),
                services.hasher.clone(),
            ),
            status: PageStatus::NoDocument,
            page: 1,
            scale: navigation::DEFAULT_SCALE,
            error_message: None,
            document: DocumentState::default(),
            attachments: Vec::new(),
        }
    }

    //=====================================================================================
    // Source selection and identity
    //=====================================================================================

    /// Replaces the current source and resets everything that belonged to the
    /// previous document, so nothing stale shows while the new id resolves.
    pub fn select_source(&mut self, source: Source) -> PendingIdentity {
        self.release_attachments();
        self.doc_id = DocumentId::empty();
        self.document = DocumentState::default();
        self.page = 1;
        self.error_message = None;
        self.status = if source.is_empty() {
            PageStatus::NoDocument
        } else {
            PageStatus::Loading
        };
        info!(source = source.label().unwrap_or("<none>"), "viewer: source selected");
        self.source = source;
        self.resolver.begin(&self.source)
    }

    /// Validates `input` as a PDF link and selects it.
    ///
    /// On rejection the message is kept for display and the current source is
    /// left untouched.
    pub fn open_url(&mut self, input: &str) -> Result<PendingIdentity, ViewerError> {
        match navigation::validate_pdf_url(input) {
            Ok(url) => Ok(self.select_source(Source::Url(url))),
            Err(e) => {
                debug!(input = %input, error = %e, "viewer: link rejected");
                self.error_message = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn open_file(
        &mut self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> PendingIdentity {
        self.select_source(Source::File {
            bytes: bytes.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        })
    }

    /// Drops the current source. Any in-flight resolution becomes stale.
    pub fn clear(&mut self) {
        let _superseding = self.select_source(Source::Empty);
    }

    /// Installs a resolved identity and loads its persisted state.
    ///
    /// Returns `false` without touching anything if a newer source has been
    /// selected since the resolution began.
    pub async fn apply_identity(&mut self, resolved: ResolvedIdentity) -> bool {
        if !self.resolver.is_current(&resolved) {
            debug!(
                generation = resolved.generation,
                current = self.resolver.current_generation(),
                "viewer: discarding stale identity"
            );
            return false;
        }

        self.release_attachments();
        self.doc_id = resolved.doc_id;
        self.document = self.notes.load_or_default(&self.doc_id);
        self.page = navigation::clamp_page(self.document.last_page, self.num_pages());
        self.attachments = self.images.load_with_handles(&self.doc_id).await;
        info!(
            doc_id = %self.doc_id,
            page = self.page,
            images = self.attachments.len(),
            "viewer: document state restored"
        );
        true
    }

    /// Selects `source`, resolves it and applies the result in one go.
    pub async fn open(&mut self, source: Source) -> bool {
        let pending = self.select_source(source);
        match pending.resolve().await {
            Some(resolved) => self.apply_identity(resolved).await,
            None => false,
        }
    }

    //=====================================================================================
    // Rendering collaborator callbacks
    //=====================================================================================

    pub fn on_document_loaded(&mut self, num_pages: u32) {
        if self.source.is_empty() {
            return;
        }
        let num_pages = num_pages.max(1);
        self.status = PageStatus::Ready { num_pages };
        self.page = navigation::clamp_page(self.page, Some(num_pages));
        info!(doc_id = %self.doc_id, num_pages, "viewer: document loaded");
    }

    pub fn on_document_failed(&mut self, message: impl Into<String>) {
        if self.source.is_empty() {
            return;
        }
        let message = message.into();
        warn!(doc_id = %self.doc_id, error = %message, "viewer: document failed to load");
        self.error_message = Some(message.clone());
        self.status = PageStatus::Failed { message };
    }

    //=====================================================================================
    // Navigation
    //=====================================================================================

    pub fn can_go_previous(&self) -> bool {
        !self.source.is_empty() && self.page > 1
    }

    /// Next is disabled until the page count is known.
    pub fn can_go_next(&self) -> bool {
        matches!(self.num_pages(), Some(total) if self.page < total)
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.go_to_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.go_to_page(self.page - 1)
    }

    /// Jumps to `page`, clamped to the document. Returns whether the page changed.
    ///
    /// Until the page count is known only backward moves are allowed, matching
    /// `can_go_next`.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if self.source.is_empty() {
            return false;
        }
        let target = navigation::clamp_page(page, self.num_pages());
        if target == self.page {
            return false;
        }
        if self.num_pages().is_none() && target > self.page {
            debug!(doc_id = %self.doc_id, target, "viewer: forward jump before page count is known");
            return false;
        }
        self.page = target;
        self.document.last_page = target;
        if let Err(e) = self.notes.set_last_page(&self.doc_id, target) {
            warn!(doc_id = %self.doc_id, error = %e, "viewer: could not persist page");
        }
        true
    }

    //=====================================================================================
    // Zoom
    //=====================================================================================

    pub fn zoom_in(&mut self) -> f64 {
        self.scale = navigation::zoom_in(self.scale);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.scale = navigation::zoom_out(self.scale);
        self.scale
    }

    pub fn set_zoom(&mut self, scale: f64) -> f64 {
        self.scale = navigation::clamp_scale(scale);
        self.scale
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.scale = navigation::DEFAULT_SCALE;
        self.scale
    }

    //=====================================================================================
    // Notes
    //=====================================================================================

    pub fn set_page_note(&mut self, text: &str) {
        self.document.set_page_note(self.page, text);
        if let Err(e) = self.notes.set_page_note(&self.doc_id, self.page, text) {
            warn!(doc_id = %self.doc_id, page = self.page, error = %e, "viewer: could not persist page note");
        }
    }

    pub fn set_global_note(&mut self, text: &str) {
        self.document.global_note = text.to_string();
        if let Err(e) = self.notes.set_global_note(&self.doc_id, text) {
            warn!(doc_id = %self.doc_id, error = %e, "viewer: could not persist note");
        }
    }

    //=====================================================================================
    // Image attachments
    //=====================================================================================

    /// Attaches an image to the current page. The in-memory list only changes
    /// if both the payload and the metadata were persisted.
    pub async fn add_image(
        &mut self,
        payload: impl Into<Bytes>,
        mime_type: &str,
        caption: Option<&str>,
    ) -> Result<&AttachedImage, ViewerError> {
        let added = self
            .images
            .add(
                &self.doc_id,
                payload.into(),
                mime_type,
                self.page,
                caption.unwrap_or(""),
            )
            .await?;
        self.attachments.insert(0, added);
        Ok(&self.attachments[0])
    }

    /// Removes an attachment and releases its display handle. Unknown ids are a no-op.
    pub async fn remove_image(&mut self, id: &str) -> Result<bool, ViewerError> {
        let removed = self.images.remove(&self.doc_id, id).await?;
        if let Some(index) = self.attachments.iter().position(|a| a.attachment.id == id) {
            let gone = self.attachments.remove(index);
            self.images.release(&gone.handle);
        }
        Ok(removed)
    }

    pub fn images_on_page(&self, page: u32) -> impl Iterator<Item = &AttachedImage> {
        self.attachments
            .iter()
            .filter(move |a| a.attachment.page == page)
    }

    fn release_attachments(&mut self) {
        for attached in self.attachments.drain(..) {
            self.images.release(&attached.handle);
        }
    }

    /// Releases every live display handle. The viewer stays usable.
    pub fn close(&mut self) {
        self.release_attachments();
    }

    //=====================================================================================
    // Accessors
    //=====================================================================================

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn doc_id(&self) -> &DocumentId {
        &self.doc_id
    }

    pub fn status(&self) -> &PageStatus {
        &self.status
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn num_pages(&self) -> Option<u32> {
        self.status.num_pages()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn page_note(&self) -> &str {
        self.document.page_note(self.page)
    }

    pub fn global_note(&self) -> &str {
        &self.document.global_note
    }

    pub fn attachments(&self) -> &[AttachedImage] {
        &self.attachments
    }

    pub fn progress_percent(&self) -> Option<u8> {
        navigation::progress_percent(self.page, self.num_pages())
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            source: SourceView::from_source(&self.source),
            doc_id: self.doc_id.to_string(),
            status: self.status.clone(),
            page: self.page,
            num_pages: self.num_pages(),
            progress_percent: self.progress_percent(),
            scale: self.scale,
            can_go_previous: self.can_go_previous(),
            can_go_next: self.can_go_next(),
            page_note: self.page_note().to_string(),
            global_note: self.global_note().to_string(),
            error: self.error_message.clone(),
            images: self
                .attachments
                .iter()
                .map(|a| ImageView {
                    id: a.attachment.id.clone(),
                    page: a.attachment.page,
                    caption: a.attachment.caption.clone(),
                    handle: a.handle.clone(),
                })
                .collect(),
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.release_attachments();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryBlobStore, MemoryDisplayHandles, MemoryStringStore, Sha256Hasher};
    use std::sync::Arc;

    fn services() -> (Services, Arc<MemoryDisplayHandles>) {
        let display = Arc::new(MemoryDisplayHandles::new());
        let services = Services {
            notes: Arc::new(MemoryStringStore::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
            display: display.clone(),
            hasher: Arc::new(Sha256Hasher),
        };
        (services, display)
    }

    #[tokio::test]
    async fn next_is_disabled_until_the_page_count_is_known() {
        let (services, _) = services();
        let mut viewer = Viewer::new(&services);
        assert!(viewer.open(Source::Url("https://example.com/a.pdf".into())).await);

        assert!(!viewer.can_go_next());
        assert!(!viewer.next_page());

        viewer.on_document_loaded(3);
        assert!(viewer.next_page());
        assert!(viewer.next_page());
        assert!(!viewer.next_page());
        assert_eq!(viewer.page(), 3);
        assert_eq!(viewer.progress_percent(), Some(100));
    }

    #[tokio::test]
    async fn navigation_persists_and_restores_the_last_page() {
        let (services, _) = services();
        let url = Source::Url("https://example.com/a.pdf".into());
        {
            let mut viewer = Viewer::new(&services);
            viewer.open(url.clone()).await;
            viewer.on_document_loaded(10);
            viewer.go_to_page(6);
        }

        let mut viewer = Viewer::new(&services);
        viewer.open(url).await;
        assert_eq!(viewer.page(), 6);
        viewer.on_document_loaded(4);
        assert_eq!(viewer.page(), 4);
    }

    #[tokio::test]
    async fn rejected_link_keeps_the_current_source() {
        let (services, _) = services();
        let mut viewer = Viewer::new(&services);
        viewer.open(Source::Url("https://example.com/a.pdf".into())).await;

        assert!(viewer.open_url("https://example.com/book").is_err());
        assert_eq!(viewer.source(), &Source::Url("https://example.com/a.pdf".into()));
        assert_eq!(viewer.error_message(), Some("The link must point to a .pdf file"));

        assert!(viewer.open_url("not a url").is_err());
        assert_eq!(viewer.error_message(), Some("Please enter a valid URL"));
    }

    #[tokio::test]
    async fn page_notes_follow_navigation() {
        let (services, _) = services();
        let mut viewer = Viewer::new(&services);
        viewer.open(Source::Url("https://example.com/a.pdf".into())).await;
        viewer.on_document_loaded(5);

        viewer.set_page_note("first page");
        viewer.next_page();
        assert_eq!(viewer.page_note(), "");
        viewer.set_page_note("second page");
        viewer.previous_page();
        assert_eq!(viewer.page_note(), "first page");
    }

    #[tokio::test]
    async fn render_failure_sticks_until_a_new_source() {
        let (services, _) = services();
        let mut viewer = Viewer::new(&services);
        viewer.open(Source::Url("https://example.com/a.pdf".into())).await;
        viewer.on_document_failed("bad xref");

        assert_eq!(
            viewer.status(),
            &PageStatus::Failed {
                message: "bad xref".to_string()
            }
        );
        viewer.open(Source::Url("https://example.com/b.pdf".into())).await;
        assert_eq!(viewer.status(), &PageStatus::Loading);
        assert_eq!(viewer.error_message(), None);
    }

    #[tokio::test]
    async fn dropping_the_viewer_releases_display_handles() {
        let (services, display) = services();
        {
            let mut viewer = Viewer::new(&services);
            viewer.open(Source::Url("https://example.com/a.pdf".into())).await;
            viewer.add_image(vec![1u8, 2, 3], "image/png", Some("one")).await.unwrap();
            viewer.add_image(vec![4u8], "image/png", None).await.unwrap();
            assert_eq!(display.live_count(), 2);
        }
        assert_eq!(display.live_count(), 0);
    }

    #[tokio::test]
    async fn jumping_forward_waits_for_the_page_count() {
        let (services, _) = services();
        let notes = NotesStore::new(services.notes.clone());
        let mut viewer = Viewer::new(&services);
        viewer.open(Source::Url("https://example.com/a.pdf".into())).await;

        assert!(!viewer.go_to_page(500));
        assert_eq!(viewer.page(), 1);
        assert!(notes.load(viewer.doc_id()).is_none());

        viewer.on_document_loaded(8);
        assert!(viewer.go_to_page(500));
        assert_eq!(viewer.page(), 8);
        assert_eq!(notes.load(viewer.doc_id()).unwrap().last_page, 8);
    }

    #[tokio::test]
    async fn restored_page_can_step_back_before_the_page_count_is_known() {
        let (services, _) = services();
        let url = Source::Url("https://example.com/a.pdf".into());
        let mut viewer = Viewer::new(&services);
        viewer.open(url.clone()).await;
        viewer.on_document_loaded(10);
        viewer.go_to_page(6);

        viewer.open(url).await;
        assert_eq!(viewer.page(), 6);
        assert!(!viewer.next_page());
        assert!(viewer.previous_page());
        assert_eq!(viewer.page(), 5);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let (services, _) = services();
        let mut viewer = Viewer::new(&services);
        assert_eq!(viewer.scale(), 1.2);
        assert_eq!(viewer.set_zoom(7.0), 3.0);
        assert_eq!(viewer.zoom_in(), 3.0);
        assert_eq!(viewer.set_zoom(0.123), 0.5);
        assert_eq!(viewer.zoom_out(), 0.5);
        assert_eq!(viewer.reset_zoom(), 1.2);
    }

    #[tokio::test]
    async fn adding_an_image_without_a_document_fails() {
        let (services, _) = services();
        let mut viewer = Viewer::new(&services);
        let err = viewer.add_image(vec![1u8], "image/png", None).await.unwrap_err();
        assert!(matches!(err, ViewerError::NoDocument));
        assert!(viewer.attachments().is_empty());
    }
}
