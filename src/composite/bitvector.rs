// ! Serialization and deserialization for BitVector

use alloc::{vec, vec::Vec};
use alloy_primitives::B256;

use crate::{
    BITS_PER_BYTE, BITS_PER_CHUNK, Merkleize, SSZError, SimpleDeserialize, SimpleSerialize,
    SszSchema, SszTypeInfo,
    merkleization::{merkleize, pack_bits},
    schema::TypeDescriptor,
};

/// Packs bits LSB-first: bit `i` lands in byte `i / 8` at position `i % 8`.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len().div_ceil(BITS_PER_BYTE)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / BITS_PER_BYTE] |= 1 << (i % BITS_PER_BYTE);
        }
    }
    bytes
}

/// Reads the first `len` bits out of `bytes`, LSB-first.
pub fn bytes_to_bits(bytes: &[u8], len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| {
            let byte = bytes.get(i / BITS_PER_BYTE).copied().unwrap_or_default();
            (byte >> (i % BITS_PER_BYTE)) & 1 == 1
        })
        .collect()
}

/// `Bitvector[N]`: exactly `N` bits, no length marker on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector<const N: usize> {
    bits: Vec<bool>,
}

impl<const N: usize> Default for BitVector<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BitVector<N> {
    pub fn new() -> Self {
        Self {
            bits: vec![false; N],
        }
    }

    pub fn from_bools(bits: &[bool]) -> Result<Self, SSZError> {
        if bits.len() != N {
            return Err(SSZError::InvalidLength {
                expected: N,
                got: bits.len(),
            });
        }
        Ok(Self {
            bits: bits.to_vec(),
        })
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<(), SSZError> {
        let bit = self
            .bits
            .get_mut(index)
            .ok_or(SSZError::IndexOutOfBounds { index, bound: N })?;
        *bit = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn as_bits(&self) -> &[bool] {
        &self.bits
    }
}

impl<const N: usize> SszTypeInfo for BitVector<N> {
    /// Indicates that the bit vector is fixed-size.
    fn is_fixed_size() -> bool {
        true
    }

    /// Returns the fixed size of the bit vector in bytes.
    fn fixed_size() -> Option<usize> {
        Some(N.div_ceil(BITS_PER_BYTE))
    }
}

impl<const N: usize> SimpleSerialize for BitVector<N> {
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        let bytes = bits_to_bytes(&self.bits);
        buffer.extend_from_slice(&bytes);
        Ok(bytes.len())
    }

    fn size_ssz(&self) -> usize {
        N.div_ceil(BITS_PER_BYTE)
    }
}

impl<const N: usize> SimpleDeserialize for BitVector<N> {
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        Ok(Self {
            bits: decode_bitvector(data, N)?,
        })
    }
}

/// Recovers `len` bits from a bitvector encoding, rejecting set bits past `len` in the last byte.
pub fn decode_bitvector(data: &[u8], len: usize) -> Result<Vec<bool>, SSZError> {
    let expected_bytes = len.div_ceil(BITS_PER_BYTE);
    if data.len() != expected_bytes {
        return Err(SSZError::InvalidLength {
            expected: expected_bytes,
            got: data.len(),
        });
    }

    let used_bits = len % BITS_PER_BYTE;
    if let Some(&last) = data.last() {
        if used_bits != 0 && last >> used_bits != 0 {
            tracing::debug!(len, last, "bitvector has bits set past its length");
            return Err(SSZError::InvalidBitvector { len });
        }
    }
    Ok(bytes_to_bits(data, len))
}

impl<const N: usize> Merkleize for BitVector<N> {
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        merkleize(&pack_bits(&self.bits), Some(Self::chunk_count()))
    }

    fn chunk_count() -> usize {
        N.div_ceil(BITS_PER_CHUNK)
    }
}

impl<const N: usize> SszSchema for BitVector<N> {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::BitVector(N)
    }
}
