//! SSZ Merkleization helper functions.

pub mod cache;
pub mod hasher;
pub mod proofs;

pub use hasher::hash_chunks;

use crate::{
    BITS_PER_CHUNK, BYTES_PER_CHUNK, MAX_MERKLE_TREE_DEPTH, Merkleize, SSZError, SimpleSerialize,
    SszTypeInfo,
    composite::bitvector::bits_to_bytes, ssz::fixed_size_of,
};
use alloc::vec::Vec;
use alloy_primitives::B256;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A 32-byte leaf or node of a Merkle tree.
pub type Chunk = [u8; BYTES_PER_CHUNK];

include!(concat!(env!("OUT_DIR"), "/zero_hashes.rs"));

/// Layers at least this wide are hashed on the rayon pool when `parallel` is enabled.
#[cfg(feature = "parallel")]
const PARALLEL_LAYER_THRESHOLD: usize = 1 << 10;

/// Root of a subtree of the given height whose leaves are all zero chunks.
pub fn zero_hash(height: usize) -> Chunk {
    ZERO_HASHES[height]
}

/// Widest tree a chunk count can be padded to.
pub const MAX_LEAF_COUNT: usize = 1 << (usize::BITS - 1);

/// Returns the next power of two >= i. 0 → 1
pub fn next_pow_of_two(i: usize) -> Result<usize, SSZError> {
    i.max(1)
        .checked_next_power_of_two()
        .ok_or(SSZError::ChunkCountExceedsLimit {
            count: i,
            limit: MAX_LEAF_COUNT,
        })
}

/// Helper enum to represent type metadata for chunk_count
pub enum SSZType {
    Basic { size: usize },
    BitList { limit: usize },
    BitVector { len: usize },
    ListBasic { elem_size: usize, limit: usize },
    VectorBasic { elem_size: usize, count: usize },
    ListComposite { limit: usize },
    VectorComposite { count: usize },
    Container { field_count: usize },
}

/// Returns the number of 32-byte chunks required for merkleization.
pub fn chunk_count(ty: SSZType) -> usize {
    match ty {
        SSZType::Basic { size: _size } => 1,
        SSZType::BitList { limit } => limit.div_ceil(BITS_PER_CHUNK),
        SSZType::BitVector { len } => len.div_ceil(BITS_PER_CHUNK),
        SSZType::ListBasic { elem_size, limit } => chunk_count_basic_list(elem_size, limit),
        SSZType::VectorBasic { elem_size, count } => packed_chunk_count(count, elem_size),
        SSZType::ListComposite { limit } => limit,
        SSZType::VectorComposite { count } => count,
        SSZType::Container { field_count } => field_count,
    }
}

/// Chunks holding `count` packed values of `elem_size` bytes each.
///
/// Computed in 128 bits so limits near `usize::MAX` do not overflow.
pub fn packed_chunk_count(count: usize, elem_size: usize) -> usize {
    let chunks = (count as u128 * elem_size as u128).div_ceil(BYTES_PER_CHUNK as u128);
    usize::try_from(chunks).unwrap_or(usize::MAX)
}

/// Chunk capacity of a list of basic values: `ceil(limit * elem_size / 32)`, at least one.
pub fn chunk_count_basic_list(elem_size: usize, limit: usize) -> usize {
    packed_chunk_count(limit, elem_size).max(1)
}

/// Chunk capacity of a list of composite values.
pub fn chunk_count_composite_list(n_items: usize, limit: usize) -> usize {
    n_items.max(limit)
}

/// Packs serialized basic values into 32-byte chunks with right-padding.
pub fn pack(bytes: &[u8]) -> Vec<Chunk> {
    let mut out = Vec::with_capacity(bytes.len().div_ceil(BYTES_PER_CHUNK));
    for chunk in bytes.chunks(BYTES_PER_CHUNK) {
        let mut chunk_buf = [0u8; BYTES_PER_CHUNK];
        chunk_buf[..chunk.len()].copy_from_slice(chunk);
        out.push(chunk_buf);
    }
    out
}

/// Serializes `values` back to back and packs the result into chunks.
pub fn pack_values<T: SimpleSerialize>(values: &[T]) -> Result<Vec<Chunk>, SSZError> {
    let mut buffer = Vec::with_capacity(values.iter().map(SimpleSerialize::size_ssz).sum());
    for value in values {
        value.serialize(&mut buffer)?;
    }
    Ok(pack(&buffer))
}

/// Packs bitfield bits into 32-byte chunks, excluding length bit for BitList.
pub fn pack_bits(bits: &[bool]) -> Vec<Chunk> {
    pack(&bits_to_bytes(bits))
}

/// Merkleize a list of 32-byte chunks.
/// Optionally apply a chunk count limit (e.g., for lists or bitlists).
///
/// Padding up to the next power of two is virtual: missing right-hand nodes are taken from the
/// precomputed zero hashes, so a list with a huge limit costs one hash per level above its data.
pub fn merkleize(chunks: &[Chunk], limit: Option<usize>) -> Result<B256, SSZError> {
    if let Some(limit) = limit {
        if chunks.len() > limit {
            tracing::debug!(count = chunks.len(), limit, "chunk count exceeds limit");
            return Err(SSZError::ChunkCountExceedsLimit {
                limit,
                count: chunks.len(),
            });
        }
    }

    let padded_len = next_pow_of_two(limit.unwrap_or(chunks.len()))?;
    let depth = padded_len.trailing_zeros() as usize;
    if depth > MAX_MERKLE_TREE_DEPTH {
        return Err(SSZError::ChunkCountExceedsLimit {
            count: chunks.len(),
            limit: MAX_LEAF_COUNT,
        });
    }

    if chunks.is_empty() {
        return Ok(B256::from(zero_hash(depth)));
    }

    let mut layer = chunks.to_vec();
    for height in 0..depth {
        if layer.len() % 2 == 1 {
            layer.push(zero_hash(height));
        }
        layer = hash_layer(&layer);
    }

    Ok(B256::from(layer[0]))
}

/// Hashes each adjacent pair of `layer` into the next layer up. `layer.len()` must be even.
fn hash_layer(layer: &[Chunk]) -> Vec<Chunk> {
    #[cfg(feature = "parallel")]
    if layer.len() >= PARALLEL_LAYER_THRESHOLD {
        return layer
            .par_chunks(2)
            .map(|pair| hash_chunks(pair[0], pair[1]))
            .collect();
    }
    layer
        .chunks(2)
        .map(|pair| hash_chunks(pair[0], pair[1]))
        .collect()
}

/// Mix in length into a Merkle root (used for lists and bitlists).
pub fn mix_in_length(root: B256, len: usize) -> B256 {
    let mut len_bytes = [0u8; BYTES_PER_CHUNK];
    len_bytes[..8].copy_from_slice(&(len as u64).to_le_bytes());
    B256::from(hash_chunks(root, len_bytes))
}

/// Hash tree roots of `values`, one chunk each.
pub fn element_roots<T: Merkleize>(values: &[T]) -> Result<Vec<Chunk>, SSZError> {
    values
        .iter()
        .map(|value| value.hash_tree_root().map(|root| root.0))
        .collect()
}

/// Hash tree roots of `values`, computed on the rayon pool.
#[cfg(feature = "parallel")]
pub fn par_element_roots<T: Merkleize + Sync>(values: &[T]) -> Result<Vec<Chunk>, SSZError> {
    values
        .par_iter()
        .map(|value| value.hash_tree_root().map(|root| root.0))
        .collect()
}

/// Roots of composite children, fanned out over rayon when `parallel` is enabled.
fn composite_roots<T: Merkleize + Sync>(values: &[T]) -> Result<Vec<Chunk>, SSZError> {
    #[cfg(feature = "parallel")]
    if values.len() > 1 {
        return par_element_roots(values);
    }
    element_roots(values)
}

/// Root of a container given its field roots in declaration order.
pub fn merkleize_container(field_roots: &[B256]) -> Result<B256, SSZError> {
    let chunks: Vec<Chunk> = field_roots.iter().map(|root| root.0).collect();
    merkleize(&chunks, Some(chunks.len()))
}

/// Root of a vector of basic values.
pub fn merkleize_vector_basic<T>(values: &[T]) -> Result<B256, SSZError>
where
    T: SimpleSerialize + SszTypeInfo,
{
    let limit = chunk_count(SSZType::VectorBasic {
        elem_size: fixed_size_of::<T>()?,
        count: values.len(),
    });
    merkleize(&pack_values(values)?, Some(limit))
}

/// Root of a vector of composite values.
pub fn merkleize_vector_composite<T: Merkleize + Sync>(values: &[T]) -> Result<B256, SSZError> {
    merkleize(&composite_roots(values)?, Some(values.len()))
}

/// Root of a list of basic values bounded by `limit` elements.
pub fn merkleize_list_basic<T>(values: &[T], limit: usize) -> Result<B256, SSZError>
where
    T: SimpleSerialize + SszTypeInfo,
{
    if values.len() > limit {
        tracing::debug!(len = values.len(), limit, "list longer than its limit");
        return Err(SSZError::LimitExceeded {
            limit,
            got: values.len(),
        });
    }
    let chunk_limit = chunk_count_basic_list(fixed_size_of::<T>()?, limit);
    let root = merkleize(&pack_values(values)?, Some(chunk_limit))?;
    Ok(mix_in_length(root, values.len()))
}

/// Root of a list of composite values bounded by `limit` elements.
pub fn merkleize_list_composite<T: Merkleize + Sync>(
    values: &[T],
    limit: usize,
) -> Result<B256, SSZError> {
    if values.len() > limit {
        tracing::debug!(len = values.len(), limit, "list longer than its limit");
        return Err(SSZError::LimitExceeded {
            limit,
            got: values.len(),
        });
    }
    let chunk_limit = chunk_count_composite_list(values.len(), limit);
    let root = merkleize(&composite_roots(values)?, Some(chunk_limit))?;
    Ok(mix_in_length(root, values.len()))
}

/// Root of an arbitrary byte slice treated as a list: packed, merkleized and length-mixed.
pub fn merkleize_byte_slice(bytes: &[u8]) -> Result<B256, SSZError> {
    let root = merkleize(&pack(bytes), None)?;
    Ok(mix_in_length(root, bytes.len()))
}
