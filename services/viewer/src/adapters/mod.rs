pub mod display;
pub mod fs_blob;
pub mod hasher;
pub mod json_file;
pub mod memory;

pub use display::MemoryDisplayHandles;
pub use fs_blob::FsBlobStore;
pub use hasher::Sha256Hasher;
pub use json_file::JsonFileStringStore;
pub use memory::{MemoryBlobStore, MemoryStringStore};
