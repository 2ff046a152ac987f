//! Serialization, deserialization and merkleization for homogeneous sequences.
//!
//! `Vec<T>` is the unbounded sequence codec shared by every sequence type. It has no hash tree
//! root of its own; bounded sequences are `List<T, N>`. `[T; N]` is the SSZ `Vector[T, N]`.

use crate::{
    Merkleize, SSZError, SimpleDeserialize, SimpleSerialize, SszSchema, SszTypeInfo,
    composite::{
        container::{Part, serialize_parts},
        offsets::{split_fixed_sequence, split_variable_sequence},
    },
    merkleization::{SSZType, chunk_count, merkleize_vector_basic, merkleize_vector_composite},
    schema::TypeDescriptor,
};
use alloc::vec::Vec;
use alloy_primitives::B256;

/// Writes `items` back to back, or behind an offset table when `T` is variable-size.
pub(crate) fn serialize_sequence<T>(items: &[T], buffer: &mut Vec<u8>) -> Result<usize, SSZError>
where
    T: SimpleSerialize + SszTypeInfo,
{
    if T::is_fixed_size() {
        let start = buffer.len();
        for item in items {
            item.serialize(buffer)?;
        }
        Ok(buffer.len() - start)
    } else {
        let parts = items.iter().map(Part::of).collect::<Result<Vec<_>, _>>()?;
        serialize_parts(&parts, buffer)
    }
}

/// Encoded length of `items` as a sequence.
pub(crate) fn sequence_size<T>(items: &[T]) -> usize
where
    T: SimpleSerialize + SszTypeInfo,
{
    let data: usize = items.iter().map(SimpleSerialize::size_ssz).sum();
    if T::is_fixed_size() {
        data
    } else {
        data + items.len() * crate::BYTES_PER_LENGTH_OFFSET
    }
}

/// Decodes a sequence of `T`. `expected_count` fixes the length; `limit` bounds it.
pub(crate) fn deserialize_sequence<T>(
    data: &[u8],
    expected_count: Option<usize>,
    limit: Option<usize>,
) -> Result<Vec<T>, SSZError>
where
    T: SimpleDeserialize + SszTypeInfo,
{
    let elements = match T::fixed_size() {
        Some(size) => split_fixed_sequence(data, size, expected_count, limit)?,
        None => split_variable_sequence(data, expected_count, limit)?,
    };
    elements.into_iter().map(T::deserialize).collect()
}

impl<T> SszTypeInfo for Vec<T>
where
    T: SszTypeInfo,
{
    ///Returns false since vectors are not primitive types.
    fn is_fixed_size() -> bool {
        false
    }

    ///Returns `None` since it is not of fixed size.
    fn fixed_size() -> Option<usize> {
        None
    }
}

impl<T> SimpleSerialize for Vec<T>
where
    T: SimpleSerialize + SszTypeInfo,
{
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        serialize_sequence(self, buffer)
    }

    fn size_ssz(&self) -> usize {
        sequence_size(self)
    }
}

impl<T> SimpleDeserialize for Vec<T>
where
    T: SimpleDeserialize + SszTypeInfo,
{
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        deserialize_sequence(data, None, None)
    }
}

impl<T, const N: usize> SszTypeInfo for [T; N]
where
    T: SszTypeInfo,
{
    fn is_fixed_size() -> bool {
        T::is_fixed_size()
    }

    fn fixed_size() -> Option<usize> {
        T::fixed_size().map(|size| size.saturating_mul(N))
    }
}

impl<T, const N: usize> SimpleSerialize for [T; N]
where
    T: SimpleSerialize + SszTypeInfo,
{
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        serialize_sequence(self, buffer)
    }

    fn size_ssz(&self) -> usize {
        sequence_size(self)
    }
}

impl<T, const N: usize> SimpleDeserialize for [T; N]
where
    T: SimpleDeserialize + SszTypeInfo,
{
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        let elements = deserialize_sequence::<T>(data, Some(N), None)?;
        let got = elements.len();
        elements
            .try_into()
            .map_err(|_| SSZError::InvalidLength { expected: N, got })
    }
}

impl<T, const N: usize> Merkleize for [T; N]
where
    T: SszTypeInfo + SimpleSerialize + Merkleize + Sync,
{
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        if T::is_basic_type() {
            merkleize_vector_basic(self)
        } else {
            merkleize_vector_composite(self)
        }
    }

    fn chunk_count() -> usize {
        match T::fixed_size() {
            Some(elem_size) if T::is_basic_type() => {
                chunk_count(SSZType::VectorBasic { elem_size, count: N })
            }
            _ => chunk_count(SSZType::VectorComposite { count: N }),
        }
    }
}

impl<T: SszSchema, const N: usize> SszSchema for [T; N] {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::vector(T::schema(), N)
    }
}
