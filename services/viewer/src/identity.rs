//! services/viewer/src/identity.rs
//!
//! Maps a selected `Source` to the `DocumentId` that namespaces its persisted state.
//!
//! URL sources resolve immediately. File sources are hashed off the async
//! executor; if hashing fails the id degrades to `file:<name>`, which collides
//! for different files sharing a name. That weaker id is logged, never hidden.
//!
//! Every selection is tagged with a generation and a cancellation token so a
//! slow resolution for an old source can be told apart from the current one.

use pdf_reader_core::domain::{DocumentId, Source};
use pdf_reader_core::ports::ContentHasher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Resolves a source to its document id, hashing file content when needed.
pub async fn resolve_document_id(source: &Source, hasher: Arc<dyn ContentHasher>) -> DocumentId {
    match source {
        Source::Empty => DocumentId::empty(),
        Source::Url(url) => DocumentId::for_url(url),
        Source::File { bytes, name, .. } => {
            let bytes = bytes.clone();
            let joined = tokio::task::spawn_blocking(move || hasher.digest(&bytes)).await;
            match joined {
                Ok(Ok(hex_digest)) => DocumentId::for_content_hash(&hex_digest),
                Ok(Err(e)) => {
                    warn!(file = %name, error = %e, "identity: hashing failed, falling back to file name");
                    DocumentId::for_file_name(name)
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "identity: hashing task failed, falling back to file name");
                    DocumentId::for_file_name(name)
                }
            }
        }
    }
}

/// The outcome of a resolution, tagged with the selection it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub generation: u64,
    pub doc_id: DocumentId,
}

/// An identity resolution that has been started but not awaited.
pub struct PendingIdentity {
    generation: u64,
    source: Source,
    hasher: Arc<dyn ContentHasher>,
    token: CancellationToken,
}

impl PendingIdentity {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the resolution. Returns `None` if a newer selection superseded this
    /// one before it finished.
    pub async fn resolve(self) -> Option<ResolvedIdentity> {
        let PendingIdentity {
            generation,
            source,
            hasher,
            token,
        } = self;

        if token.is_cancelled() {
            debug!(generation, "identity: superseded before start");
            return None;
        }

        tokio::select! {
            _ = token.cancelled() => {
                debug!(generation, "identity: superseded while resolving");
                None
            }
            doc_id = resolve_document_id(&source, hasher) => {
                Some(ResolvedIdentity { generation, doc_id })
            }
        }
    }
}

/// Hands out generation-tagged resolutions, cancelling the previous one each time.
pub struct IdentityResolver {
    hasher: Arc<dyn ContentHasher>,
    generation: u64,
    token: CancellationToken,
}

impl IdentityResolver {
    pub fn new(hasher: Arc<dyn ContentHasher>) -> Self {
        Self {
            hasher,
            generation: 0,
            token: CancellationToken::new(),
        }
    }

    /// Starts resolving `source`, superseding any in-flight resolution.
    pub fn begin(&mut self, source: &Source) -> PendingIdentity {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.generation += 1;
        PendingIdentity {
            generation: self.generation,
            source: source.clone(),
            hasher: self.hasher.clone(),
            token: self.token.clone(),
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, resolved: &ResolvedIdentity) -> bool {
        resolved.generation == self.generation
    }
}
