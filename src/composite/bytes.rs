//! Byte vectors and byte lists.
//!
//! Both are raw byte copies on the wire. `ByteVector<N>` is alloy's `FixedBytes<N>`, so `B256`
//! hashes and roots can be used as SSZ fields directly.

use crate::{
    BYTES_PER_CHUNK, Merkleize, SSZError, SimpleDeserialize, SimpleSerialize, SszSchema,
    SszTypeInfo,
    merkleization::{chunk_count_basic_list, merkleize, mix_in_length, pack},
    schema::TypeDescriptor,
};
use alloc::vec::Vec;
use alloy_primitives::{B256, FixedBytes};
use core::ops::Deref;

/// `ByteVector[N]`.
pub type ByteVector<const N: usize> = FixedBytes<N>;

impl<const N: usize> SszTypeInfo for FixedBytes<N> {
    fn is_fixed_size() -> bool {
        true
    }

    fn fixed_size() -> Option<usize> {
        Some(N)
    }
}

impl<const N: usize> SimpleSerialize for FixedBytes<N> {
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        buffer.extend_from_slice(self.as_slice());
        Ok(N)
    }

    fn size_ssz(&self) -> usize {
        N
    }
}

impl<const N: usize> SimpleDeserialize for FixedBytes<N> {
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        let bytes: [u8; N] = data.try_into().map_err(|_| SSZError::InvalidLength {
            expected: N,
            got: data.len(),
        })?;
        Ok(FixedBytes(bytes))
    }
}

impl<const N: usize> Merkleize for FixedBytes<N> {
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        merkleize(&pack(self.as_slice()), Some(Self::chunk_count()))
    }

    fn chunk_count() -> usize {
        N.div_ceil(BYTES_PER_CHUNK)
    }
}

impl<const N: usize> SszSchema for FixedBytes<N> {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::ByteVector(N)
    }
}

/// `ByteList[N]`: at most `N` raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ByteList<const N: usize> {
    bytes: Vec<u8>,
}

impl<const N: usize> ByteList<N> {
    pub fn new(bytes: Vec<u8>) -> Result<Self, SSZError> {
        if bytes.len() > N {
            return Err(SSZError::LimitExceeded {
                limit: N,
                got: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl<const N: usize> Deref for ByteList<N> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl<const N: usize> TryFrom<&[u8]> for ByteList<N> {
    type Error = SSZError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes.to_vec())
    }
}

impl<const N: usize> SszTypeInfo for ByteList<N> {
    fn is_fixed_size() -> bool {
        false
    }

    fn fixed_size() -> Option<usize> {
        None
    }
}

impl<const N: usize> SimpleSerialize for ByteList<N> {
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        buffer.extend_from_slice(&self.bytes);
        Ok(self.bytes.len())
    }

    fn size_ssz(&self) -> usize {
        self.bytes.len()
    }
}

impl<const N: usize> SimpleDeserialize for ByteList<N> {
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        if data.len() > N {
            tracing::debug!(limit = N, got = data.len(), "byte list too long");
        }
        Self::new(data.to_vec())
    }
}

impl<const N: usize> Merkleize for ByteList<N> {
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        let root = merkleize(&pack(&self.bytes), Some(Self::chunk_count()))?;
        Ok(mix_in_length(root, self.bytes.len()))
    }

    fn chunk_count() -> usize {
        chunk_count_basic_list(1, N)
    }
}

impl<const N: usize> SszSchema for ByteList<N> {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::ByteList(N)
    }
}
