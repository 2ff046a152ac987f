//! Schema-driven SSZ values.
//!
//! [`SszValue`] holds data whose type is only known at runtime. Every operation takes the
//! [`TypeDescriptor`] the value is interpreted against; a value whose shape does not match its
//! descriptor is rejected with [`SSZError::TypeMismatch`].

use crate::{
    BYTES_PER_CHUNK, SSZError, SimpleDeserialize, SimpleSerialize,
    composite::{
        bitlist::{decode_bitlist, encode_bitlist},
        bitvector::{bits_to_bytes, decode_bitvector},
        container::{Part, serialize_parts},
        offsets::{split_container, split_fixed_sequence, split_variable_sequence},
    },
    merkleization::{Chunk, merkleize, mix_in_length, pack, pack_bits},
    schema::{BasicType, ContainerSchema, SequenceSchema, TypeDescriptor},
};
use alloc::{string::String, vec::Vec};
use alloy_primitives::{B256, U256};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A value of any SSZ type. Container fields are positional, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SszValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    Vector(Vec<SszValue>),
    List(Vec<SszValue>),
    ByteVector(Vec<u8>),
    ByteList(Vec<u8>),
    BitVector(Vec<bool>),
    BitList(Vec<bool>),
    Container(Vec<SszValue>),
}

impl SszValue {
    /// Name of the variant, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::U8(_) => "U8",
            Self::U16(_) => "U16",
            Self::U32(_) => "U32",
            Self::U64(_) => "U64",
            Self::U128(_) => "U128",
            Self::U256(_) => "U256",
            Self::Vector(_) => "Vector",
            Self::List(_) => "List",
            Self::ByteVector(_) => "ByteVector",
            Self::ByteList(_) => "ByteList",
            Self::BitVector(_) => "BitVector",
            Self::BitList(_) => "BitList",
            Self::Container(_) => "Container",
        }
    }

    /// Number of elements, bytes, bits or fields; `None` for basic values.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Vector(items) | Self::List(items) | Self::Container(items) => Some(items.len()),
            Self::ByteVector(bytes) | Self::ByteList(bytes) => Some(bytes.len()),
            Self::BitVector(bits) | Self::BitList(bits) => Some(bits.len()),
            _ => None,
        }
    }

    /// Child at `index` of a vector, list or container.
    pub fn get(&self, index: usize) -> Option<&SszValue> {
        match self {
            Self::Vector(items) | Self::List(items) | Self::Container(items) => items.get(index),
            _ => None,
        }
    }
}

macro_rules! impl_from_basic {
    ($($type:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$type> for SszValue {
                fn from(value: $type) -> Self {
                    SszValue::$variant(value)
                }
            }
        )+
    };
}

impl_from_basic!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    U256 => U256,
);

fn mismatch(ty: &TypeDescriptor, value: &SszValue) -> SSZError {
    SSZError::TypeMismatch {
        expected: ty.name(),
        got: String::from(value.variant_name()),
    }
}

fn check_exact(expected: usize, got: usize) -> Result<(), SSZError> {
    if expected != got {
        return Err(SSZError::InvalidLength { expected, got });
    }
    Ok(())
}

fn check_limit(limit: usize, got: usize) -> Result<(), SSZError> {
    if got > limit {
        return Err(SSZError::LimitExceeded { limit, got });
    }
    Ok(())
}

fn serialize_basic(
    basic: BasicType,
    value: &SszValue,
    buffer: &mut Vec<u8>,
) -> Result<usize, SSZError> {
    match (basic, value) {
        (BasicType::Bool, SszValue::Bool(v)) => v.serialize(buffer),
        (BasicType::U8, SszValue::U8(v)) => v.serialize(buffer),
        (BasicType::U16, SszValue::U16(v)) => v.serialize(buffer),
        (BasicType::U32, SszValue::U32(v)) => v.serialize(buffer),
        (BasicType::U64, SszValue::U64(v)) => v.serialize(buffer),
        (BasicType::U128, SszValue::U128(v)) => v.serialize(buffer),
        (BasicType::U256, SszValue::U256(v)) => v.serialize(buffer),
        _ => Err(mismatch(&TypeDescriptor::Basic(basic), value)),
    }
}

fn deserialize_basic(basic: BasicType, data: &[u8]) -> Result<SszValue, SSZError> {
    Ok(match basic {
        BasicType::Bool => SszValue::Bool(bool::deserialize(data)?),
        BasicType::U8 => SszValue::U8(u8::deserialize(data)?),
        BasicType::U16 => SszValue::U16(u16::deserialize(data)?),
        BasicType::U32 => SszValue::U32(u32::deserialize(data)?),
        BasicType::U64 => SszValue::U64(u64::deserialize(data)?),
        BasicType::U128 => SszValue::U128(u128::deserialize(data)?),
        BasicType::U256 => SszValue::U256(U256::deserialize(data)?),
    })
}

impl SequenceSchema {
    fn serialize_elements(&self, items: &[SszValue], buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        if self.elem.is_fixed_size() {
            let start = buffer.len();
            for item in items {
                self.elem.serialize_into(item, buffer)?;
            }
            Ok(buffer.len() - start)
        } else {
            let parts = items
                .iter()
                .map(|item| self.elem.serialize(item).map(Part::Variable))
                .collect::<Result<Vec<_>, _>>()?;
            serialize_parts(&parts, buffer)
        }
    }

    fn deserialize_elements(
        &self,
        data: &[u8],
        expected_count: Option<usize>,
        limit: Option<usize>,
    ) -> Result<Vec<SszValue>, SSZError> {
        let elements = match self.elem_fixed_size() {
            Some(size) => split_fixed_sequence(data, size, expected_count, limit)?,
            None => split_variable_sequence(data, expected_count, limit)?,
        };
        elements
            .into_iter()
            .map(|bytes| self.elem.deserialize(bytes))
            .collect()
    }

    fn elements_size(&self, items: &[SszValue]) -> Result<usize, SSZError> {
        if let Some(size) = self.elem_fixed_size() {
            return Ok(size.saturating_mul(items.len()));
        }
        items.iter().try_fold(0, |total, item| {
            Ok(total + crate::BYTES_PER_LENGTH_OFFSET + self.elem.size_ssz(item)?)
        })
    }

    /// Leaves of the data subtree: packed basics, or one root per element.
    fn element_chunks(&self, items: &[SszValue]) -> Result<Vec<Chunk>, SSZError> {
        if let TypeDescriptor::Basic(_) = self.elem {
            let mut buffer = Vec::new();
            self.serialize_elements(items, &mut buffer)?;
            return Ok(pack(&buffer));
        }

        #[cfg(feature = "parallel")]
        let roots = items
            .par_iter()
            .map(|item| self.elem.hash_tree_root(item).map(|root| root.0))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let roots = items
            .iter()
            .map(|item| self.elem.hash_tree_root(item).map(|root| root.0))
            .collect();
        roots
    }
}

impl ContainerSchema {
    fn check_field_count(&self, fields: &[SszValue]) -> Result<(), SSZError> {
        check_exact(self.fields.len(), fields.len())
    }
}

impl TypeDescriptor {
    /// Serializes `value` into a fresh buffer.
    pub fn serialize(&self, value: &SszValue) -> Result<Vec<u8>, SSZError> {
        let mut buffer = Vec::new();
        self.serialize_into(value, &mut buffer)?;
        Ok(buffer)
    }

    /// Appends the encoding of `value` to `buffer`, returning the number of bytes written.
    pub fn serialize_into(&self, value: &SszValue, buffer: &mut Vec<u8>) -> Result<usize, SSZError> {
        match (self, value) {
            (Self::Basic(basic), _) => serialize_basic(*basic, value, buffer),
            (Self::Vector(seq), SszValue::Vector(items)) => {
                check_exact(seq.bound, items.len())?;
                seq.serialize_elements(items, buffer)
            }
            (Self::List(seq), SszValue::List(items)) => {
                check_limit(seq.bound, items.len())?;
                seq.serialize_elements(items, buffer)
            }
            (Self::ByteVector(len), SszValue::ByteVector(bytes)) => {
                check_exact(*len, bytes.len())?;
                buffer.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            (Self::ByteList(limit), SszValue::ByteList(bytes)) => {
                check_limit(*limit, bytes.len())?;
                buffer.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            (Self::BitVector(len), SszValue::BitVector(bits)) => {
                check_exact(*len, bits.len())?;
                let bytes = bits_to_bytes(bits);
                buffer.extend_from_slice(&bytes);
                Ok(bytes.len())
            }
            (Self::BitList(limit), SszValue::BitList(bits)) => {
                check_limit(*limit, bits.len())?;
                let bytes = encode_bitlist(bits);
                buffer.extend_from_slice(&bytes);
                Ok(bytes.len())
            }
            (Self::Container(container), SszValue::Container(fields)) => {
                container.check_field_count(fields)?;
                let parts = container
                    .fields
                    .iter()
                    .zip(fields)
                    .map(|(field, value)| {
                        let bytes = field.ty.serialize(value)?;
                        Ok(if field.ty.is_fixed_size() {
                            Part::Fixed(bytes)
                        } else {
                            Part::Variable(bytes)
                        })
                    })
                    .collect::<Result<Vec<_>, SSZError>>()?;
                serialize_parts(&parts, buffer)
            }
            _ => Err(mismatch(self, value)),
        }
    }

    /// Decodes `data` as a value of this type.
    pub fn deserialize(&self, data: &[u8]) -> Result<SszValue, SSZError> {
        match self {
            Self::Basic(basic) => deserialize_basic(*basic, data),
            Self::Vector(seq) => Ok(SszValue::Vector(seq.deserialize_elements(
                data,
                Some(seq.bound),
                None,
            )?)),
            Self::List(seq) => Ok(SszValue::List(seq.deserialize_elements(
                data,
                None,
                Some(seq.bound),
            )?)),
            Self::ByteVector(len) => {
                check_exact(*len, data.len())?;
                Ok(SszValue::ByteVector(data.to_vec()))
            }
            Self::ByteList(limit) => {
                check_limit(*limit, data.len())?;
                Ok(SszValue::ByteList(data.to_vec()))
            }
            Self::BitVector(len) => Ok(SszValue::BitVector(decode_bitvector(data, *len)?)),
            Self::BitList(limit) => Ok(SszValue::BitList(decode_bitlist(data, *limit)?)),
            Self::Container(container) => {
                let parts = split_container(data, &container.fixed_region_layout())?;
                let fields = container
                    .fields
                    .iter()
                    .zip(parts)
                    .map(|(field, bytes)| field.ty.deserialize(bytes))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SszValue::Container(fields))
            }
        }
    }

    /// Length in bytes of the encoding of `value`.
    pub fn size_ssz(&self, value: &SszValue) -> Result<usize, SSZError> {
        match (self, value) {
            (Self::Basic(basic), _) => {
                let mut scratch = Vec::with_capacity(basic.size());
                serialize_basic(*basic, value, &mut scratch)
            }
            (Self::Vector(seq), SszValue::Vector(items))
            | (Self::List(seq), SszValue::List(items)) => seq.elements_size(items),
            (Self::ByteVector(_), SszValue::ByteVector(bytes))
            | (Self::ByteList(_), SszValue::ByteList(bytes)) => Ok(bytes.len()),
            (Self::BitVector(len), SszValue::BitVector(_)) => Ok(len.div_ceil(8)),
            (Self::BitList(_), SszValue::BitList(bits)) => Ok(bits.len() / 8 + 1),
            (Self::Container(container), SszValue::Container(fields)) => {
                container.check_field_count(fields)?;
                container
                    .fields
                    .iter()
                    .zip(fields)
                    .try_fold(0, |total, (field, value)| {
                        let size = match field.ty.fixed_size() {
                            Some(size) => size,
                            None => crate::BYTES_PER_LENGTH_OFFSET + field.ty.size_ssz(value)?,
                        };
                        Ok(total + size)
                    })
            }
            _ => Err(mismatch(self, value)),
        }
    }

    /// Leaves of the data subtree of `value`, before padding.
    pub fn chunks(&self, value: &SszValue) -> Result<Vec<Chunk>, SSZError> {
        match (self, value) {
            (Self::Basic(basic), _) => {
                let mut bytes = Vec::with_capacity(BYTES_PER_CHUNK);
                serialize_basic(*basic, value, &mut bytes)?;
                Ok(pack(&bytes))
            }
            (Self::Vector(seq), SszValue::Vector(items)) => {
                check_exact(seq.bound, items.len())?;
                seq.element_chunks(items)
            }
            (Self::List(seq), SszValue::List(items)) => {
                check_limit(seq.bound, items.len())?;
                seq.element_chunks(items)
            }
            (Self::ByteVector(len), SszValue::ByteVector(bytes)) => {
                check_exact(*len, bytes.len())?;
                Ok(pack(bytes))
            }
            (Self::ByteList(limit), SszValue::ByteList(bytes)) => {
                check_limit(*limit, bytes.len())?;
                Ok(pack(bytes))
            }
            (Self::BitVector(len), SszValue::BitVector(bits)) => {
                check_exact(*len, bits.len())?;
                Ok(pack_bits(bits))
            }
            (Self::BitList(limit), SszValue::BitList(bits)) => {
                check_limit(*limit, bits.len())?;
                Ok(pack_bits(bits))
            }
            (Self::Container(container), SszValue::Container(fields)) => {
                container.check_field_count(fields)?;
                container
                    .fields
                    .iter()
                    .zip(fields)
                    .map(|(field, value)| field.ty.hash_tree_root(value).map(|root| root.0))
                    .collect()
            }
            _ => Err(mismatch(self, value)),
        }
    }

    /// Root of the data subtree of `value`, before any length mix-in.
    pub fn data_root(&self, value: &SszValue) -> Result<B256, SSZError> {
        merkleize(&self.chunks(value)?, Some(self.chunk_count()))
    }

    /// Computes the hash tree root of `value`.
    pub fn hash_tree_root(&self, value: &SszValue) -> Result<B256, SSZError> {
        let root = self.data_root(value)?;
        if self.is_list_like() {
            let len = value.len().ok_or_else(|| mismatch(self, value))?;
            Ok(mix_in_length(root, len))
        } else {
            Ok(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BitList, ErrorKind, List, Merkleize, SszSchema, merkleization::merkleize_byte_slice,
        serialize,
    };
    use alloc::vec;

    fn u64_ty() -> TypeDescriptor {
        TypeDescriptor::Basic(BasicType::U64)
    }

    fn mixed() -> TypeDescriptor {
        TypeDescriptor::container(
            "Mixed",
            [
                ("slot", u64_ty()),
                ("values", TypeDescriptor::list(u64_ty(), 8)),
            ],
        )
    }

    fn mixed_value() -> SszValue {
        SszValue::Container(vec![
            SszValue::U64(5),
            SszValue::List(vec![1u64.into(), 2u64.into(), 3u64.into()]),
        ])
    }

    #[test]
    fn test_container_scenario() {
        let ty = mixed();
        let value = mixed_value();
        let bytes = ty.serialize(&value).unwrap();
        assert_eq!(bytes.len(), 36);
        assert_eq!(ty.size_ssz(&value), Ok(36));
        assert_eq!(&bytes[8..12], &[12, 0, 0, 0]);
        assert_eq!(ty.deserialize(&bytes), Ok(value));
    }

    #[test]
    fn test_matches_static_codec() {
        let list = List::<u64, 8>::new(vec![1, 2, 3]).unwrap();
        let ty = List::<u64, 8>::schema();
        let value = SszValue::List(vec![1u64.into(), 2u64.into(), 3u64.into()]);
        assert_eq!(ty.serialize(&value).unwrap(), serialize(&list).unwrap());
        assert_eq!(ty.hash_tree_root(&value).unwrap(), list.hash_tree_root().unwrap());

        let bits = BitList::<16>::from_bools(&[true, false, true]).unwrap();
        let value = SszValue::BitList(vec![true, false, true]);
        let ty = BitList::<16>::schema();
        assert_eq!(ty.serialize(&value).unwrap(), serialize(&bits).unwrap());
        assert_eq!(ty.hash_tree_root(&value).unwrap(), bits.hash_tree_root().unwrap());
    }

    #[test]
    fn test_byte_list_root_matches_byte_slice() {
        let ty = TypeDescriptor::ByteList(32);
        let value = SszValue::ByteList(vec![1, 2, 3]);
        assert_eq!(
            ty.hash_tree_root(&value).unwrap(),
            merkleize_byte_slice(&[1, 2, 3]).unwrap()
        );
    }

    #[test]
    fn test_shape_errors() {
        let ty = mixed();
        let wrong = SszValue::Container(vec![SszValue::U32(5), SszValue::List(vec![])]);
        let err = ty.serialize(&wrong).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);

        let short = SszValue::Container(vec![SszValue::U64(5)]);
        assert_eq!(
            ty.serialize(&short),
            Err(SSZError::InvalidLength {
                expected: 2,
                got: 1
            })
        );

        let list_ty = TypeDescriptor::list(u64_ty(), 2);
        let too_long = SszValue::List(vec![1u64.into(), 2u64.into(), 3u64.into()]);
        assert_eq!(
            list_ty.hash_tree_root(&too_long),
            Err(SSZError::LimitExceeded { limit: 2, got: 3 })
        );
        assert_eq!(
            list_ty.serialize(&SszValue::Vector(vec![])).unwrap_err().kind(),
            ErrorKind::UnsupportedType
        );
    }

    #[test]
    fn test_decode_rejections() {
        let ty = mixed();
        assert_eq!(
            ty.deserialize(&[0; 11]).unwrap_err().kind(),
            ErrorKind::InvalidLength
        );
        let mut bytes = ty.serialize(&mixed_value()).unwrap();
        bytes[8] = 40;
        assert_eq!(
            ty.deserialize(&bytes).unwrap_err().kind(),
            ErrorKind::InvalidOffset
        );

        let vector = TypeDescriptor::vector(TypeDescriptor::Basic(BasicType::U16), 3);
        assert_eq!(
            vector.deserialize(&[0; 5]),
            Err(SSZError::InvalidLength {
                expected: 6,
                got: 5
            })
        );
        assert_eq!(
            TypeDescriptor::Basic(BasicType::Bool).deserialize(&[2]),
            Err(SSZError::InvalidBooleanByte(2))
        );
    }

    #[test]
    fn test_value_accessors() {
        let value = mixed_value();
        assert_eq!(value.len(), Some(2));
        assert_eq!(value.get(0), Some(&SszValue::U64(5)));
        assert_eq!(value.get(1).and_then(SszValue::len), Some(3));
        assert_eq!(SszValue::U8(1).len(), None);
        assert_eq!(SszValue::from(true), SszValue::Bool(true));
    }
}
