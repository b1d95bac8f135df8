pub mod domain;
pub mod ports;

pub use domain::{Blob, DisplayHandle, DocumentId, DocumentState, ImageAttachment, Source};
pub use ports::{BlobStore, ContentHasher, DisplayHandles, PortError, PortResult, StringStore};
