//! services/viewer/src/adapters/hasher.rs
//!
//! SHA-256 implementation of the `ContentHasher` port.

use pdf_reader_core::ports::{ContentHasher, PortResult};
use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// A `ContentHasher` backed by SHA-256. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn digest(&self, bytes: &[u8]) -> PortResult<String> {
        Ok(sha256_hex(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input_is_the_known_value() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn digest_is_deterministic_and_content_sensitive() {
        let hasher = Sha256Hasher;
        let a = hasher.digest(b"%PDF-1.7 one").unwrap();
        let b = hasher.digest(b"%PDF-1.7 one").unwrap();
        let c = hasher.digest(b"%PDF-1.7 two").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
    }
}
