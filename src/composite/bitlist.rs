// ! Serialization and deserialization for bitlist

use crate::{
    BITS_PER_BYTE, BITS_PER_CHUNK, Merkleize, SSZError, SimpleDeserialize, SimpleSerialize,
    SszSchema, SszTypeInfo,
    composite::bitvector::bytes_to_bits,
    merkleization::{merkleize, mix_in_length, pack_bits},
    schema::TypeDescriptor,
};
use alloc::{vec, vec::Vec};
use alloy_primitives::B256;

/// `Bitlist[N]`: up to `N` bits followed on the wire by a sentinel bit marking the length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitList<const N: usize> {
    bits: Vec<bool>,
}

impl<const N: usize> Default for BitList<N> {
    fn default() -> Self {
        Self { bits: vec![] }
    }
}

impl<const N: usize> TryFrom<&[bool]> for BitList<N> {
    type Error = SSZError;

    fn try_from(slice: &[bool]) -> Result<Self, Self::Error> {
        BitList::from_bools(slice)
    }
}

impl<const N: usize> BitList<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bools(bits: &[bool]) -> Result<Self, SSZError> {
        if bits.len() > N {
            return Err(SSZError::LimitExceeded {
                limit: N,
                got: bits.len(),
            });
        }
        Ok(Self {
            bits: bits.to_vec(),
        })
    }

    pub fn push(&mut self, bit: bool) -> Result<(), SSZError> {
        if self.bits.len() >= N {
            return Err(SSZError::LimitExceeded {
                limit: N,
                got: self.bits.len() + 1,
            });
        }
        self.bits.push(bit);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<(), SSZError> {
        let bound = self.bits.len();
        let bit = self
            .bits
            .get_mut(index)
            .ok_or(SSZError::IndexOutOfBounds { index, bound })?;
        *bit = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_bits(&self) -> &[bool] {
        &self.bits
    }
}

/// Encodes `bits` with the sentinel bit at position `bits.len()`.
pub fn encode_bitlist(bits: &[bool]) -> Vec<u8> {
    let len = bits.len();
    let mut bytes = vec![0u8; len / BITS_PER_BYTE + 1];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / BITS_PER_BYTE] |= 1 << (i % BITS_PER_BYTE);
        }
    }
    bytes[len / BITS_PER_BYTE] |= 1 << (len % BITS_PER_BYTE);
    bytes
}

/// Recovers the bits of a bitlist encoding, checking the count against `limit`.
///
/// A zero final byte carries no sentinel and decodes to an empty list.
pub fn decode_bitlist(data: &[u8], limit: usize) -> Result<Vec<bool>, SSZError> {
    let Some(&last) = data.last() else {
        return Err(SSZError::InvalidLength {
            expected: 1,
            got: 0,
        });
    };
    if last == 0 {
        tracing::debug!(len = data.len(), "bitlist without sentinel bit");
        return Ok(Vec::new());
    }

    let sentinel = (u8::BITS - last.leading_zeros() - 1) as usize;
    let len = (data.len() - 1) * BITS_PER_BYTE + sentinel;
    if len > limit {
        tracing::debug!(len, limit, "bitlist longer than its limit");
        return Err(SSZError::LimitExceeded { limit, got: len });
    }
    Ok(bytes_to_bits(data, len))
}

impl<const N: usize> SszTypeInfo for BitList<N> {
    fn is_fixed_size() -> bool {
        false
    }

    fn fixed_size() -> Option<usize> {
        None
    }
}

impl<const N: usize> SimpleSerialize for BitList<N> {
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        let bytes = encode_bitlist(&self.bits);
        buffer.extend_from_slice(&bytes);
        Ok(bytes.len())
    }

    fn size_ssz(&self) -> usize {
        self.bits.len() / BITS_PER_BYTE + 1
    }
}

impl<const N: usize> SimpleDeserialize for BitList<N> {
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        Ok(Self {
            bits: decode_bitlist(data, N)?,
        })
    }
}

impl<const N: usize> Merkleize for BitList<N> {
    /// Merkleizes the bits without the sentinel and mixes in the bit count.
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        let root = merkleize(&pack_bits(&self.bits), Some(Self::chunk_count()))?;
        Ok(mix_in_length(root, self.bits.len()))
    }

    fn chunk_count() -> usize {
        N.div_ceil(BITS_PER_CHUNK)
    }
}

impl<const N: usize> SszSchema for BitList<N> {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::BitList(N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, serialize};
    use alloy_primitives::hex;

    #[test]
    fn test_bitlist_literal_vectors() {
        assert_eq!(encode_bitlist(&[]), [0b0000_0001]);
        assert_eq!(encode_bitlist(&[true]), [0b0000_0011]);
        assert_eq!(
            encode_bitlist(&[true, false, true, false, true, false, true]),
            [0b1101_0101]
        );
        assert_eq!(encode_bitlist(&[true; 8]), [0b1111_1111, 0b0000_0001]);
        assert_eq!(encode_bitlist(&[true; 9]), [0b1111_1111, 0b0000_0011]);
    }

    #[test]
    fn test_bitlist_decode_literal_vectors() {
        assert_eq!(decode_bitlist(&[0b0000_0001], 8), Ok(vec![]));
        assert_eq!(decode_bitlist(&[0b0000_0011], 8), Ok(vec![true]));
        assert_eq!(
            decode_bitlist(&[0b1101_0101], 8),
            Ok(vec![true, false, true, false, true, false, true])
        );
        assert_eq!(decode_bitlist(&[0xff, 0x01], 8), Ok(vec![true; 8]));
        assert_eq!(decode_bitlist(&[0xff, 0x03], 9), Ok(vec![true; 9]));
    }

    #[test]
    fn test_bitlist_zero_trailing_byte_is_empty() {
        assert_eq!(decode_bitlist(&[0b0000_0000], 8), Ok(vec![]));
        assert_eq!(decode_bitlist(&[0xff, 0x00], 8), Ok(vec![]));
        assert!(BitList::<8>::deserialize(&[0]).unwrap().is_empty());
    }

    #[test]
    fn test_bitlist_rejections() {
        assert_eq!(
            BitList::<8>::deserialize(&[]),
            Err(SSZError::InvalidLength {
                expected: 1,
                got: 0
            })
        );
        let err = BitList::<8>::deserialize(&[0xff, 0x03]).unwrap_err();
        assert_eq!(err, SSZError::LimitExceeded { limit: 8, got: 9 });
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_bitlist_push_and_limit() {
        let mut bl = BitList::<2>::new();
        bl.push(true).unwrap();
        bl.push(false).unwrap();
        assert!(bl.push(true).is_err());
        assert!(BitList::<2>::from_bools(&[true; 3]).is_err());
        bl.set(1, true).unwrap();
        assert_eq!(bl.as_bits(), &[true, true]);
        assert!(bl.set(2, true).is_err());
        assert_eq!(serialize(&bl).unwrap(), [0b0000_0111]);
        assert_eq!(bl.size_ssz(), 1);
    }

    #[test]
    fn test_bitlist_hash_tree_root() {
        // Bits 1101 packed into one chunk, mixed with length 4.
        let bl = BitList::<8>::from_bools(&[true, false, true, true]).unwrap();
        let mut chunk = [0u8; 32];
        chunk[0] = 0b1101;
        assert_eq!(
            bl.hash_tree_root().unwrap(),
            mix_in_length(B256::from(chunk), 4)
        );

        let empty = BitList::<2048>::new();
        assert_eq!(BitList::<2048>::chunk_count(), 8);
        assert_eq!(
            empty.hash_tree_root().unwrap(),
            mix_in_length(
                B256::from(hex!(
                    "c78009fdf07fc56a11f122370658a353aaa542ed63e44c4bc15ff4cd105ab33c"
                )),
                0
            )
        );
    }
}
