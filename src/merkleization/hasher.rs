use crate::BYTES_PER_CHUNK;

use sha2::{Digest, Sha256};

/// Hashes two 32-byte nodes into their parent node.
#[inline]
pub fn hash_chunks(left: impl AsRef<[u8]>, right: impl AsRef<[u8]>) -> [u8; BYTES_PER_CHUNK] {
    debug_assert!(left.as_ref().len() == BYTES_PER_CHUNK);
    debug_assert!(right.as_ref().len() == BYTES_PER_CHUNK);
    let mut hasher = Sha256::new();
    hasher.update(left.as_ref());
    hasher.update(right.as_ref());
    hasher.finalize().into()
}

/// SHA-256 of arbitrary bytes.
#[inline]
pub fn hash(data: impl AsRef<[u8]>) -> [u8; BYTES_PER_CHUNK] {
    Sha256::digest(data.as_ref()).into()
}
