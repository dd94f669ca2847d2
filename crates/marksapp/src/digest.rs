//! SHA-256 helpers shared by records, paths, the tracker, and the manifest.

use sha2::{Digest, Sha256};

/// Label written into `summary.json` as `hash_algorithm`.
pub const HASH_ALGORITHM: &str = "sha256";

/// Lower-case hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// The first `len` hex digits of [`sha256_hex`].
pub fn short_hash(bytes: &[u8], len: usize) -> String {
    let mut full = sha256_hex(bytes);
    full.truncate(len.min(full.len()));
    full
}
