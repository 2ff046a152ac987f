//! Contains all the constants required for ssz implementation.

/// Number of bytes per chunk.
pub const BYTES_PER_CHUNK: usize = 32;
/// Number of bytes per serialized length offset.
pub const BYTES_PER_LENGTH_OFFSET: usize = 4;
/// Number of bits per byte.
pub const BITS_PER_BYTE: usize = 8;
/// Number of bits packed into a single chunk.
pub const BITS_PER_CHUNK: usize = BYTES_PER_CHUNK * BITS_PER_BYTE;
/// Bytes per U256.
pub const BYTES: usize = 32;
/// Deepest tree the merkleizer will pad to. Matches the zero hash table built by `build.rs`.
pub const MAX_MERKLE_TREE_DEPTH: usize = 64;
/// First encoded length that a 4-byte offset can no longer address.
pub const MAX_ENCODED_LENGTH: u64 = 1 << (BYTES_PER_LENGTH_OFFSET * BITS_PER_BYTE);
