pub mod adapters;
pub mod bridge;
pub mod config;
pub mod error;
pub mod identity;
pub mod images;
pub mod notes;
pub mod viewer;

pub use error::ViewerError;
pub use viewer::{Services, Viewer};
