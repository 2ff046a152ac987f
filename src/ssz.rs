//! This module provides a simple serialization and deserialization mechanism for data structures.

use crate::{
    SSZError,
    gindex::{GeneralizedIndex, resolve_generalized_index},
    schema::TypeDescriptor,
};
use alloc::{string::ToString, vec::Vec};
use alloy_primitives::B256;

/// The `SimpleSerialize` trait defines methods for serializing data structures
pub trait SimpleSerialize: Sized {
    /// Serializes the data structure into a byte vector, returning the number of bytes written.
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError>;

    /// Length of the encoding of this value in bytes.
    fn size_ssz(&self) -> usize;
}

/// The `SimpleDeserialize` trait defines methods for deserializing data structures
pub trait SimpleDeserialize: Sized {
    /// Deserializes the data structure from a byte slice.
    fn deserialize(data: &[u8]) -> Result<Self, SSZError>;
}

/// Classification of an SSZ type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SszKind {
    /// Boolean or fixed-width unsigned integer.
    Basic,
    /// Composite type whose encoding length depends only on the type.
    FixedComposite,
    /// Composite type whose encoding length depends on the value.
    VariableComposite,
}

/// The `SszTypeInfo` trait provides information about the size characteristics of a type.
pub trait SszTypeInfo {
    /// If Some(size), then type is fixed-size with known size in bytes.
    /// If None, then it's variable-size (e.g. Vec<u8>, String, etc).
    fn is_fixed_size() -> bool;
    /// If fixed-size, returns the size in bytes.
    fn fixed_size() -> Option<usize>;
    /// Returns true if this type is a basic type (e.g. u8, u16, etc).
    fn is_basic_type() -> bool {
        false
    }

    /// Classifies the type. Depends only on the type, never on a value.
    fn kind() -> SszKind {
        if Self::is_basic_type() {
            SszKind::Basic
        } else if Self::is_fixed_size() {
            SszKind::FixedComposite
        } else {
            SszKind::VariableComposite
        }
    }
}

/// Merkleization trait for SSZ types
pub trait Merkleize {
    /// Calculate the hash tree root of this value
    fn hash_tree_root(&self) -> Result<B256, SSZError>;

    /// Get the chunk count for merkleization
    fn chunk_count() -> usize
    where
        Self: Sized,
    {
        1 // Default for basic types
    }
}

/// Types that can describe themselves as a [`TypeDescriptor`].
///
/// This bridges statically typed values to the schema-driven tooling (generalized indices,
/// proofs, dynamic decoding).
pub trait SszSchema {
    /// Returns the schema of this type.
    fn schema() -> TypeDescriptor;

    /// Resolves a `/`-delimited path against this type.
    fn generalized_index(path: &str) -> Result<GeneralizedIndex, SSZError> {
        resolve_generalized_index(&Self::schema(), path)
    }
}

/// Returns the classification of `T`.
pub fn classify<T: SszTypeInfo>() -> SszKind {
    T::kind()
}

/// Serializes `value` into a freshly allocated buffer.
pub fn serialize<T: SimpleSerialize>(value: &T) -> Result<Vec<u8>, SSZError> {
    let mut buffer = Vec::with_capacity(value.size_ssz());
    value.serialize(&mut buffer)?;
    Ok(buffer)
}

/// Deserializes a `T` from `data`.
pub fn deserialize<T: SimpleDeserialize>(data: &[u8]) -> Result<T, SSZError> {
    T::deserialize(data)
}

/// Computes the hash tree root of `value`.
pub fn hash_tree_root<T: Merkleize>(value: &T) -> Result<B256, SSZError> {
    value.hash_tree_root()
}

/// Fixed size of `T`, or an error naming the type when it is variable-size.
pub(crate) fn fixed_size_of<T: SszTypeInfo>() -> Result<usize, SSZError> {
    T::fixed_size().ok_or_else(|| SSZError::UnsupportedType(core::any::type_name::<T>().to_string()))
}
