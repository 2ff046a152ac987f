//! Memoization of hash tree roots for repeated values.

use crate::{Merkleize, SSZError, SimpleSerialize, merkleization::hasher::hash, ssz::serialize};
use alloc::vec::Vec;
use alloy_primitives::B256;
use core::num::NonZeroUsize;
use lru::LruCache;

/// Tuning for a [`HashCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of roots kept before the least recently used entry is evicted.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Bounded LRU cache from `(type, encoding)` to hash tree root.
///
/// Two values of the same type with the same encoding always share a root, so the key is the
/// digest of the length-prefixed type name followed by the serialized bytes. A capacity of zero
/// disables storage.
#[derive(Debug)]
pub struct HashCache {
    entries: Option<LruCache<[u8; 32], B256>>,
    hits: u64,
    misses: u64,
}

impl Default for HashCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl HashCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: NonZeroUsize::new(config.capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the root of `value`, computing and storing it on a miss.
    pub fn hash_tree_root<T>(&mut self, value: &T) -> Result<B256, SSZError>
    where
        T: SimpleSerialize + Merkleize,
    {
        let key = Self::key::<T>(value)?;
        if let Some(root) = self.entries.as_mut().and_then(|entries| entries.get(&key)) {
            self.hits += 1;
            tracing::trace!(ty = core::any::type_name::<T>(), "hash cache hit");
            return Ok(*root);
        }

        self.misses += 1;
        tracing::trace!(ty = core::any::type_name::<T>(), "hash cache miss");
        let root = value.hash_tree_root()?;
        if let Some(entries) = self.entries.as_mut() {
            if let Some((evicted, _)) = entries.push(key, root) {
                if evicted != key {
                    tracing::trace!(len = entries.len(), "hash cache eviction");
                }
            }
        }
        Ok(root)
    }

    fn key<T: SimpleSerialize>(value: &T) -> Result<[u8; 32], SSZError> {
        let type_name = core::any::type_name::<T>().as_bytes();
        let mut preimage = Vec::with_capacity(8 + type_name.len() + value.size_ssz());
        preimage.extend_from_slice(&(type_name.len() as u64).to_le_bytes());
        preimage.extend_from_slice(type_name);
        preimage.extend_from_slice(&serialize(value)?);
        Ok(hash(preimage))
    }

    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.cap().get())
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }
}
