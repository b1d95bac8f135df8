//! services/viewer/src/error.rs
//!
//! Defines the primary error type for the viewer service.

use crate::config::ConfigError;
use pdf_reader_core::ports::PortError;

/// The primary error type for the `viewer` service.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The input does not parse as a URL.
    #[error("Please enter a valid URL")]
    InvalidUrl(String),

    /// The URL parses but its path does not name a PDF.
    #[error("The link must point to a .pdf file")]
    NotPdfLink(String),

    /// A picked or dropped file is not of the kind the collaborator accepts.
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// An operation needs an active document and there is none.
    #[error("No document is open")]
    NoDocument,

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a JSON encoding or decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., reading a dropped file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    /// True for mistakes the user can fix by changing their input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ViewerError::InvalidUrl(_) | ViewerError::NotPdfLink(_) | ViewerError::UnsupportedFile(_)
        )
    }
}
