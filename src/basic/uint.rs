//! Serialization and deserialzation for uint values.

use crate::constants::BYTES;
use crate::schema::{BasicType, TypeDescriptor};
use crate::{Merkleize, SSZError, SimpleDeserialize, SimpleSerialize, SszSchema, SszTypeInfo};
use alloc::vec::Vec;
use alloy_primitives::{B256, U256};

macro_rules! impl_uint {
    ($type:ty, $bytes:expr, $basic:ident) => {
        impl SimpleSerialize for $type {
            /// Implements serialization for unsigned integers.
            fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
                buffer.extend_from_slice(&self.to_le_bytes());
                Ok($bytes)
            }

            fn size_ssz(&self) -> usize {
                $bytes
            }
        }

        impl SimpleDeserialize for $type {
            /// Implements the deserialization trait for unsigned integers.
            fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
                let bytes: [u8; $bytes] =
                    data.try_into().map_err(|_| SSZError::InvalidLength {
                        expected: $bytes,
                        got: data.len(),
                    })?;
                Ok(Self::from_le_bytes(bytes))
            }
        }

        impl SszTypeInfo for $type {
            /// Returns true if the type is fixed-size.
            fn is_fixed_size() -> bool {
                true
            }

            /// Returns the fixed size in bytes.
            fn fixed_size() -> Option<usize> {
                Some($bytes)
            }

            fn is_basic_type() -> bool {
                true
            }
        }

        impl Merkleize for $type {
            /// returns `hash_tree_root` for uint
            fn hash_tree_root(&self) -> Result<B256, SSZError> {
                let mut buf = [0u8; 32];
                buf[..$bytes].copy_from_slice(&self.to_le_bytes());
                Ok(B256::from(buf))
            }
        }

        impl SszSchema for $type {
            fn schema() -> TypeDescriptor {
                TypeDescriptor::Basic(BasicType::$basic)
            }
        }
    };
}

impl_uint!(u8, 1, U8);
impl_uint!(u16, 2, U16);
impl_uint!(u32, 4, U32);
impl_uint!(u64, 8, U64);
impl_uint!(u128, 16, U128);

impl SimpleSerialize for U256 {
    /// Implements serialization for U256.
    fn serialize(&self, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        buffer.extend_from_slice(&self.to_le_bytes::<{ BYTES }>());
        Ok(BYTES)
    }

    fn size_ssz(&self) -> usize {
        BYTES
    }
}

impl SimpleDeserialize for U256 {
    /// Implements the deserialization trait for U256.
    fn deserialize(data: &[u8]) -> Result<Self, SSZError> {
        let bytes: [u8; BYTES] = data.try_into().map_err(|_| SSZError::InvalidLength {
            expected: BYTES,
            got: data.len(),
        })?;
        Ok(U256::from_le_bytes(bytes))
    }
}

impl SszTypeInfo for U256 {
    /// Returns true if the type is fixed-size.
    fn is_fixed_size() -> bool {
        true
    }

    /// Returns the fixed size in bytes.
    fn fixed_size() -> Option<usize> {
        Some(BYTES)
    }

    fn is_basic_type() -> bool {
        true
    }
}

impl Merkleize for U256 {
    /// returns `hash_tree_root` for u256
    fn hash_tree_root(&self) -> Result<B256, SSZError> {
        Ok(B256::from(self.to_le_bytes::<{ BYTES }>()))
    }
}

impl SszSchema for U256 {
    fn schema() -> TypeDescriptor {
        TypeDescriptor::Basic(BasicType::U256)
    }
}
