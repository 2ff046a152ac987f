//! Serializes, deserializes and merkleizes fixed vectors.

use crate::{
    Merkleize, SSZError, SimpleDeserialize, SimpleSerialize, SszSchema, SszTypeInfo,
    schema::TypeDescriptor,
};
use alloc::vec::Vec;
use alloy_primitives::B256;
use core::ops::{Deref, DerefMut};

/// `Vector[T, N]` as a named wrapper over `[T; N]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedVector<T, const N: usize>([T; N]);

impl<T, const N: usize> FixedVector<T, N> {
    pub fn new(data: [T; N]) -> Self {
        Self(data)
    }

    pub fn into_inner(self) -> [T; N] {
        self.0
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for FixedVector<T, N> {
    type Error = SSZError;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        let got = items.len();
        items
            .try_into()
            .map(Self)
            .map_err(|_| SSZError::InvalidLength { expected: N, got })
    }
}

impl<T: Default, const N: usize> Default for FixedVector<T, N> {
    fn default() -> Self {
        Self(core::array::from_fn(|_| T::default()))
    }
}

impl<T, const N: usize> Deref for FixedVector<T, N> {
    type Target = [T; N];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, const N: usize> DerefMut for FixedVector<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T, const N: usize> SszTypeInfo for FixedVector<T, N>
where
    T: SszTypeInfo,
{
    fn is_fixed_size() -> bool {
        <[T; N]>::is_fixed_size()
    }

    fn fixed_size() -> Option<usize> {
        <[T; N]>::fixed_size()
    }
}

impl<T, const N: usize> SimpleSerialize for FixedVector<T, N>
where
    T: SimpleSerialize + SszTypeInfo,
{
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        self.0.serialize(buffer)
    }

    fn size_ssz(&self) -> usize {
        self.0.size_ssz()
    }
}

impl<T, const N: usize> SimpleDeserialize for FixedVector<T, N>
where
    T: SimpleDeserialize + SszTypeInfo,
{
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        <[T; N]>::deserialize(data).map(Self)
    }
}

impl<T, const N: usize> Merkleize for FixedVector<T, N>
where
    T: Merkleize + SimpleSerialize + SszTypeInfo + Sync,
{
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        self.0.hash_tree_root()
    }

    fn chunk_count() -> usize {
        <[T; N]>::chunk_count()
    }
}

impl<T: SszSchema, const N: usize> SszSchema for FixedVector<T, N> {
    fn schema() -> TypeDescriptor {
        <[T; N]>::schema()
    }
}
