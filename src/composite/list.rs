//! Serializes, deserializes and merkleizes lists.

use crate::{
    Merkleize, SSZError, SimpleDeserialize, SimpleSerialize, SszSchema, SszTypeInfo,
    composite::vectors::{deserialize_sequence, sequence_size, serialize_sequence},
    merkleization::{
        SSZType, chunk_count, merkleize_list_basic, merkleize_list_composite,
    },
    schema::TypeDescriptor,
};
use alloc::vec::Vec;
use alloy_primitives::B256;
use core::ops::Deref;

/// `List[T, N]`: a homogeneous sequence of at most `N` elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct List<T, const N: usize> {
    items: Vec<T>,
}

impl<T, const N: usize> Default for List<T, N> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T, const N: usize> List<T, N> {
    /// Wraps `items`, failing if there are more than `N`.
    pub fn new(items: Vec<T>) -> Result<Self, SSZError> {
        if items.len() > N {
            return Err(SSZError::LimitExceeded {
                limit: N,
                got: items.len(),
            });
        }
        Ok(Self { items })
    }

    pub fn push(&mut self, item: T) -> Result<(), SSZError> {
        if self.items.len() >= N {
            return Err(SSZError::LimitExceeded {
                limit: N,
                got: self.items.len() + 1,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Maximum number of elements.
    pub const fn limit() -> usize {
        N
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T, const N: usize> Deref for List<T, N> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for List<T, N> {
    type Error = SSZError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl<T, const N: usize> IntoIterator for List<T, N> {
    type Item = T;
    type IntoIter = alloc::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a List<T, N> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T, const N: usize> SszTypeInfo for List<T, N>
where
    T: SszTypeInfo,
{
    fn is_fixed_size() -> bool {
        false
    }

    fn fixed_size() -> Option<usize> {
        None
    }
}

impl<T, const N: usize> SimpleSerialize for List<T, N>
where
    T: SimpleSerialize + SszTypeInfo,
{
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        serialize_sequence(&self.items, buffer)
    }

    fn size_ssz(&self) -> usize {
        sequence_size(&self.items)
    }
}

impl<T, const N: usize> SimpleDeserialize for List<T, N>
where
    T: SimpleDeserialize + SszTypeInfo,
{
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        let items = deserialize_sequence(data, None, Some(N))?;
        Ok(Self { items })
    }
}

impl<T, const N: usize> Merkleize for List<T, N>
where
    T: SszTypeInfo + SimpleSerialize + Merkleize + Sync,
{
    /// Merkleizes up to the list's capacity and mixes in its current length.
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        if T::is_basic_type() {
            merkleize_list_basic(&self.items, N)
        } else {
            merkleize_list_composite(&self.items, N)
        }
    }

    fn chunk_count() -> usize {
        match T::fixed_size() {
            Some(elem_size) if T::is_basic_type() => {
                chunk_count(SSZType::ListBasic { elem_size, limit: N })
            }
            _ => chunk_count(SSZType::ListComposite { limit: N }),
        }
    }
}

impl<T: SszSchema, const N: usize> SszSchema for List<T, N> {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::list(T::schema(), N)
    }
}
