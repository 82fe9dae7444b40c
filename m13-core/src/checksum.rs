//! Salted MD5 checksums for serialized save data.
//!
//! The digest is `md5(data ++ salt)` rendered as 32 lowercase hex characters.
//! Empty data has no checksum and yields an empty string.

use md5::{Digest, Md5};

/// Length of a hex-encoded digest
pub const DIGEST_HEX_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumService;

impl ChecksumService {
    pub fn new() -> Self {
        Self
    }

    pub fn digest(&self, data: &str, salt: &str) -> String {
        if data.is_empty() {
            return String::new();
        }

        let mut hasher = Md5::new();
        hasher.update(data.as_bytes());
        hasher.update(salt.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Recompute and compare, ignoring hex case
    pub fn verify(&self, data: &str, salt: &str, expected: &str) -> bool {
        if data.is_empty() || expected.is_empty() {
            return false;
        }
        self.digest(data, salt).eq_ignore_ascii_case(expected.trim())
    }
}
